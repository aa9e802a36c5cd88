use crate::signal::SignalKind;
use std::collections::HashSet;

/// Which kinds are currently shown. Filtering only hides signals from the
/// render view; hidden signals keep decaying and drifting as usual.
#[derive(Debug, Clone)]
pub struct KindFilter {
    enabled: bool,
    hidden: HashSet<SignalKind>,
}

impl KindFilter {
    pub fn new() -> Self {
        Self {
            enabled: true,
            hidden: HashSet::new(),
        }
    }

    pub fn allows(&self, kind: SignalKind) -> bool {
        !self.enabled || !self.hidden.contains(&kind)
    }

    pub fn toggle(&mut self, kind: SignalKind) {
        if !self.hidden.remove(&kind) {
            self.hidden.insert(kind);
        }
    }

    pub fn all_visible(&self) -> bool {
        self.hidden.is_empty()
    }

    /// Shows everything unless everything is already shown, in which case
    /// hides everything.
    pub fn toggle_all(&mut self) {
        if self.all_visible() {
            self.hidden.extend(SignalKind::ALL);
        } else {
            self.hidden.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn hidden_kinds(&self) -> Vec<SignalKind> {
        let mut kinds: Vec<SignalKind> = self.hidden.iter().copied().collect();
        kinds.sort();
        kinds
    }
}

impl Default for KindFilter {
    fn default() -> Self {
        Self::new()
    }
}

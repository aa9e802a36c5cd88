use crate::signal::kind::SignalKind;
use serde::{Deserialize, Serialize};

/// Raw emitter reported by a scanner, before clamping and lifecycle state
/// are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub kind: SignalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub name: String,
    /// Unclamped; anything outside 0-100 is pulled into range on conversion.
    pub strength: i32,
    pub distance: f64,
    pub angle: f64,
}

impl SignalRecord {
    pub fn new(
        kind: SignalKind,
        name: impl Into<String>,
        strength: i32,
        distance: f64,
        angle: f64,
    ) -> Self {
        Self {
            kind,
            icon: None,
            name: name.into(),
            strength,
            distance,
            angle,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn icon_or_default(&self) -> &str {
        self.icon.as_deref().unwrap_or_else(|| self.kind.icon())
    }
}

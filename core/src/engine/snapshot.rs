use crate::signal::{PositionSample, Signal, SignalId, SignalKind, SignalOrigin};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleView {
    pub distance: f64,
    pub angle: f64,
    pub strength: u8,
    pub age_secs: f64,
    pub was_illuminated: bool,
}

impl SampleView {
    fn from_sample(sample: &PositionSample, now: Instant) -> Self {
        Self {
            distance: sample.distance,
            angle: sample.angle,
            strength: sample.strength,
            age_secs: now.saturating_duration_since(sample.timestamp).as_secs_f64(),
            was_illuminated: sample.was_illuminated,
        }
    }
}

/// Read-only copy of one signal as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalView {
    pub id: SignalId,
    pub kind: SignalKind,
    pub icon: String,
    pub name: String,
    pub origin: SignalOrigin,
    pub strength: u8,
    pub distance: f64,
    pub angle: f64,
    pub phase: u32,
    pub persistence: f64,
    pub age_secs: f64,
    pub history: Vec<SampleView>,
    pub selected: bool,
}

impl SignalView {
    pub fn from_signal(signal: &Signal, now: Instant, selected: bool) -> Self {
        Self {
            id: signal.id,
            kind: signal.kind,
            icon: signal.icon.clone(),
            name: signal.name.clone(),
            origin: signal.origin,
            strength: signal.strength(),
            distance: signal.distance(),
            angle: signal.angle(),
            phase: signal.phase(),
            persistence: signal.persistence(),
            age_secs: signal.age(now).as_secs_f64(),
            history: signal
                .history()
                .iter()
                .map(|sample| SampleView::from_sample(sample, now))
                .collect(),
            selected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCount {
    pub kind: SignalKind,
    pub count: usize,
}

/// Point-in-time frame handed across the render boundary. Only visible,
/// filter-passing signals are included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadarSnapshot {
    pub sweep_angle: f64,
    pub sweep_speed: f64,
    pub paused: bool,
    pub real_data: bool,
    pub filtering: bool,
    pub hidden_kinds: Vec<SignalKind>,
    pub selected: Option<SignalId>,
    /// Live signals including hidden and faded ones.
    pub tracked: usize,
    pub signals: Vec<SignalView>,
    pub counts: Vec<KindCount>,
}

impl RadarSnapshot {
    pub fn visible_count(&self) -> usize {
        self.signals.len()
    }

    pub fn selected_signal(&self) -> Option<&SignalView> {
        self.signals.iter().find(|view| view.selected)
    }

    pub fn count_of(&self, kind: SignalKind) -> usize {
        self.counts
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

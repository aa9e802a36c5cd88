pub mod history;
pub mod kind;
pub mod model;
pub mod record;

pub use history::{PositionHistory, PositionSample};
pub use kind::{DriftProfile, Mobility, SignalKind};
pub use model::{
    Signal, SignalId, SignalLimits, SignalOrigin, DECAY_RATE, VISIBILITY_THRESHOLD,
};
pub use record::SignalRecord;

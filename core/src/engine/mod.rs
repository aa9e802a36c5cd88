pub mod controls;
pub mod filter;
pub mod snapshot;
pub mod spawn;
pub mod tick;

pub use controls::ControlCommand;
pub use filter::KindFilter;
pub use snapshot::{KindCount, RadarSnapshot, SampleView, SignalView};
pub use tick::RadarEngine;

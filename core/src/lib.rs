//! Signal lifecycle and scan-aggregation core for the terminal radar.
//!
//! The modules split the radar into a per-signal model with decay and
//! position history, a pluggable scanner contract with a rate-limited,
//! timeout-bounded coordinator, a collector that always yields something
//! renderable, and the per-frame tick engine that owns every live signal.

pub mod clock;
pub mod engine;
pub mod math;
pub mod prelude;
pub mod scanning;
pub mod signal;
pub mod telemetry;

pub use engine::{ControlCommand, RadarEngine, RadarSnapshot};
pub use prelude::{RadarConfig, ScanConfig, ScanError, ScanResult};
pub use scanning::{RealDataCollector, ScanContext, ScanCoordinator, Scanner};
pub use signal::{Signal, SignalKind, SignalRecord};

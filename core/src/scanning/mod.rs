pub mod collector;
pub mod coordinator;
pub mod scanner;

pub use collector::RealDataCollector;
pub use coordinator::{ScanCoordinator, ScanPhase};
pub use scanner::{ScanContext, Scanner};

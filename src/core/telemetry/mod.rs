pub mod conveyor;
pub mod production;

// Re-export commonly used types
pub use conveyor::{ConveyorBank, ConveyorStatus};
pub use production::{LineIndicators, ProductionCounters};

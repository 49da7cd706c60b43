pub mod core;

// Re-export commonly used types
pub use crate::core::execution::{EngineConfig, FlowConfig, ProcessFlowSimulator, SimulationEngine};
pub use crate::core::status::{
    ErrorRecord, OperatorRole, RunState, Severity, StatusStore, SystemStatus,
};
pub use crate::core::types::{CubeColor, ItemId, Position, Stage};

pub mod config;
pub mod process_flow;
pub mod simulation_engine;
pub mod timer;

// Re-export commonly used types
pub use config::{ConfigError, EngineConfig, FlowConfig, LayoutConfig};
pub use process_flow::{
    FlowState, FlowStats, ProcessFlowSimulator, RobotActivity, SortedCounts, WorkItem,
};
pub use simulation_engine::{SimulationEngine, SimulationObserver};
pub use timer::IntervalTimer;

pub mod machine;
pub mod records;
pub mod store;

// Re-export commonly used types
pub use machine::{RunState, StatusCommand, SystemStatus};
pub use records::{ErrorRecord, ErrorState, OperatorRole, Severity};
pub use store::{StatusObserver, StatusStore};

pub mod poller;
pub mod source;

// Re-export commonly used types
pub use poller::{detection_key, recent_by_color, DetectionPoller};
pub use source::{Detection, DetectionError, DetectionSource, HttpDetectionSource};

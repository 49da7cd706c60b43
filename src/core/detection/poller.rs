use super::source::{Detection, DetectionSource};
use crate::core::execution::timer::IntervalTimer;
use log::{debug, info};
use std::collections::HashSet;

/// Colors the vision view shows
const TRACKED_COLORS: [&str; 3] = ["red", "blue", "green"];

/// Polls a detection source on the simulated clock.
///
/// A failed poll keeps the previous list; nothing distinguishes an outage
/// from an idle camera except the absence of updates.
pub struct DetectionPoller<S: DetectionSource> {
    source: S,
    detections: Vec<Detection>,
    stream_url: String,
    connected: bool,
    processing: bool,
    timer: IntervalTimer,
    polls: u64,
    failures: u64,
}

impl<S: DetectionSource> DetectionPoller<S> {
    /// Create a connected, processing poller. The first `advance` polls
    /// immediately.
    pub fn new(source: S, stream_url: impl Into<String>, poll_interval_ms: u64) -> Self {
        Self {
            source,
            detections: Vec::new(),
            stream_url: stream_url.into(),
            connected: true,
            processing: true,
            timer: IntervalTimer::primed(poll_interval_ms),
            polls: 0,
            failures: 0,
        }
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Live video URL; handed to the viewer as-is
    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Total polls attempted
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Polls that failed and left the list unchanged
    pub fn failures(&self) -> u64 {
        self.failures
    }

    fn is_polling(&self) -> bool {
        self.connected && self.processing
    }

    /// Point the viewer at a new stream and start polling again
    pub fn connect(&mut self, stream_url: impl Into<String>) {
        self.stream_url = stream_url.into();
        if !self.connected {
            self.timer = IntervalTimer::primed(self.timer.period_ms());
        }
        self.connected = true;
        info!("camera stream set to {}", self.stream_url);
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    /// Pause or resume detection processing
    pub fn set_processing(&mut self, processing: bool) {
        if processing && !self.processing {
            self.timer = IntervalTimer::primed(self.timer.period_ms());
        }
        self.processing = processing;
    }

    /// Advance the poll timer and return the number of polls made
    pub fn advance(&mut self, elapsed_ms: u64) -> u64 {
        if !self.is_polling() {
            return 0;
        }
        let due = self.timer.advance(elapsed_ms);
        for _ in 0..due {
            self.poll_once();
        }
        due
    }

    /// Poll now. Failures are logged and swallowed.
    pub fn poll_once(&mut self) {
        self.polls += 1;
        match self.source.fetch() {
            Ok(detections) => {
                debug!("received {} detections", detections.len());
                self.detections = detections;
            }
            Err(e) => {
                self.failures += 1;
                debug!("detection poll failed, keeping previous list: {}", e);
            }
        }
    }
}

/// Most recent red, blue and green detection, in list order, one per color
pub fn recent_by_color(detections: &[Detection]) -> Vec<&Detection> {
    let mut seen = HashSet::new();
    let mut recent = Vec::new();
    for detection in detections {
        if !TRACKED_COLORS.contains(&detection.color.as_str()) {
            continue;
        }
        if seen.insert(detection.color.as_str()) {
            recent.push(detection);
        }
        if seen.len() == TRACKED_COLORS.len() {
            break;
        }
    }
    recent
}

/// Stable key for rendering a detection
pub fn detection_key(detection: &Detection) -> String {
    format!(
        "{}_{}_{}_{}",
        detection.color, detection.timestamp, detection.x, detection.y
    )
}

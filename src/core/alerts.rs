//! Simulated error feed and error log filtering

use crate::core::execution::config::AlertConfig;
use crate::core::execution::timer::IntervalTimer;
use crate::core::status::{ErrorRecord, ErrorState, Severity};
use chrono::Utc;
use log::debug;
use rand::Rng;

const COMPONENTS: [&str; 5] = [
    "KUKA Robot",
    "Conveyor 1",
    "Conveyor 2",
    "Camera System",
    "Vision System",
];

const DESCRIPTIONS: [&str; 4] = [
    "Unexpected system behavior detected",
    "Communication timeout",
    "Sensor reading out of range",
    "Performance degradation detected",
];

const DEFAULT_INSTRUCTIONS: &str = "Investigate and take appropriate action";

/// Random source of line errors
#[derive(Debug, Clone)]
pub struct AlertFeed {
    config: AlertConfig,
    timer: IntervalTimer,
    next_sequence: u64,
}

impl AlertFeed {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            timer: IntervalTimer::new(config.check_interval_ms),
            config,
            // Leave room for the seeded E001/E002 records
            next_sequence: 100,
        }
    }

    /// Advance the feed and return any errors raised in that time
    pub fn advance<R: Rng + ?Sized>(&mut self, elapsed_ms: u64, rng: &mut R) -> Vec<ErrorRecord> {
        let checks = self.timer.advance(elapsed_ms);
        if !self.config.enabled {
            return Vec::new();
        }
        let p = self.config.raise_probability.clamp(0.0, 1.0);
        let mut raised = Vec::new();
        for _ in 0..checks {
            if rng.gen_bool(p) {
                raised.push(self.raise(rng));
            }
        }
        raised
    }

    /// Build one random error record
    pub fn raise<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ErrorRecord {
        let severity = Severity::ALL[rng.gen_range(0..Severity::ALL.len())];
        let component = COMPONENTS[rng.gen_range(0..COMPONENTS.len())];
        let description = DESCRIPTIONS[rng.gen_range(0..DESCRIPTIONS.len())];
        let code = format!("SYS_{:03}", rng.gen_range(0..999));
        let id = format!("E{:03}", self.next_sequence);
        self.next_sequence += 1;

        debug!("alert feed raised {} ({}) on {}", id, severity, component);
        ErrorRecord::new(id, severity, component)
            .with_timestamp(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string())
            .with_code(code)
            .with_description(description)
            .with_instructions(DEFAULT_INSTRUCTIONS)
    }
}

/// The two records the error page starts with
pub fn seed_errors() -> Vec<ErrorRecord> {
    vec![
        ErrorRecord::new("E001", Severity::Critical, "KUKA Robot")
            .with_timestamp("2024-01-15 14:23:15")
            .with_code("ROB_001")
            .with_description("Robot arm position sensor malfunction")
            .with_instructions("Check sensor connections and recalibrate robot arm"),
        ErrorRecord::new("E002", Severity::Warning, "Conveyor 1")
            .with_timestamp("2024-01-15 13:45:22")
            .with_code("CNV_003")
            .with_description("Motor temperature above normal range")
            .with_state(ErrorState::Acknowledged)
            .with_instructions("Monitor temperature and reduce speed if necessary"),
    ]
}

/// Query over the error log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorFilter {
    /// Case-insensitive substring of description, component or code
    pub search: String,
    pub severity: Option<Severity>,
    pub state: Option<ErrorState>,
}

impl ErrorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_state(mut self, state: ErrorState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn matches(&self, record: &ErrorRecord) -> bool {
        let needle = self.search.to_lowercase();
        let text_match = needle.is_empty()
            || record.description.to_lowercase().contains(&needle)
            || record.component.to_lowercase().contains(&needle)
            || record.code.to_lowercase().contains(&needle);
        let severity_match = self.severity.map_or(true, |s| s == record.severity);
        let state_match = self.state.map_or(true, |s| s == record.state);
        text_match && severity_match && state_match
    }

    pub fn apply<'a>(&self, records: &'a [ErrorRecord]) -> Vec<&'a ErrorRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

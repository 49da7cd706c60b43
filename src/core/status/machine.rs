//! Run/stop/error state of the sorting line
//!
//! Every consumer's view of the line is a function of `SystemStatus`, and
//! `SystemStatus` only changes through `transition`.

use super::records::{ErrorRecord, ErrorState};
use serde::{Deserialize, Serialize};

/// Line run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Producing
    Active,
    /// Stopped by the operator
    Idle,
    /// Stopped by an emergency stop or a critical error
    Error,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Active => write!(f, "Active"),
            RunState::Idle => write!(f, "Idle"),
            RunState::Error => write!(f, "Error"),
        }
    }
}

/// Commands accepted by the status store
#[derive(Debug, Clone, PartialEq)]
pub enum StatusCommand {
    Start,
    Stop,
    EmergencyStop,
    ReportError(ErrorRecord),
    Acknowledge(String),
    Resolve(String),
    ClearResolved,
}

impl StatusCommand {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            StatusCommand::Start => "start",
            StatusCommand::Stop => "stop",
            StatusCommand::EmergencyStop => "emergency_stop",
            StatusCommand::ReportError(_) => "report_error",
            StatusCommand::Acknowledge(_) => "acknowledge",
            StatusCommand::Resolve(_) => "resolve",
            StatusCommand::ClearResolved => "clear_resolved",
        }
    }
}

/// Process-wide line status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub is_running: bool,
    pub state: RunState,
    pub critical_error_count: u32,
    pub acknowledged_error_count: u32,
    /// Error log, newest first
    pub errors: Vec<ErrorRecord>,
}

impl Default for SystemStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemStatus {
    /// Status at application start: running and active with no errors
    pub fn new() -> Self {
        Self {
            is_running: true,
            state: RunState::Active,
            critical_error_count: 0,
            acknowledged_error_count: 0,
            errors: Vec::new(),
        }
    }

    /// Replace the error log. Counters and run state are left as they are,
    /// so loaded records never stop the line.
    pub fn with_error_log(mut self, records: Vec<ErrorRecord>) -> Self {
        self.errors = records;
        self
    }

    /// Whether simulated production may proceed
    pub fn can_produce(&self) -> bool {
        self.is_running && self.state != RunState::Error
    }

    pub fn is_error(&self) -> bool {
        self.state == RunState::Error
    }

    /// Look up an error record by id
    pub fn find(&self, id: &str) -> Option<&ErrorRecord> {
        self.errors.iter().find(|e| e.id == id)
    }

    /// Number of critical errors nobody has acknowledged or resolved yet
    pub fn active_critical_errors(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| e.is_critical() && e.state == ErrorState::Active)
            .count()
    }

    /// Apply a command and return the next status.
    ///
    /// No command fails. Commands naming an unknown error id leave the
    /// status unchanged.
    pub fn transition(self, command: StatusCommand) -> Self {
        match command {
            StatusCommand::Start => self.start(),
            StatusCommand::Stop => self.stop(),
            StatusCommand::EmergencyStop => self.emergency_stop(),
            StatusCommand::ReportError(record) => self.report_error(record),
            StatusCommand::Acknowledge(id) => self.acknowledge(&id),
            StatusCommand::Resolve(id) => self.resolve(&id),
            StatusCommand::ClearResolved => self.clear_resolved(),
        }
    }

    /// Resume production. Ignored while any critical error is outstanding.
    pub fn start(mut self) -> Self {
        if self.critical_error_count == 0 {
            self.is_running = true;
            self.state = RunState::Active;
        }
        self
    }

    pub fn stop(mut self) -> Self {
        self.is_running = false;
        self.state = RunState::Idle;
        self
    }

    pub fn emergency_stop(mut self) -> Self {
        self.is_running = false;
        self.state = RunState::Error;
        self
    }

    pub fn report_error(mut self, record: ErrorRecord) -> Self {
        if record.is_critical() {
            self.critical_error_count = self.critical_error_count.saturating_add(1);
            self.is_running = false;
            self.state = RunState::Error;
        }
        self.errors.insert(0, record);
        self
    }

    /// Acknowledge an error.
    ///
    /// Any record with the id is marked acknowledged, whatever its current
    /// state, and the acknowledged count goes up on every call. Acknowledging
    /// twice counts twice; acknowledging a resolved record reopens it as
    /// acknowledged. Unknown ids change nothing.
    pub fn acknowledge(mut self, id: &str) -> Self {
        let mut matched = false;
        for record in self.errors.iter_mut().filter(|e| e.id == id) {
            record.state = ErrorState::Acknowledged;
            matched = true;
        }
        if matched {
            self.acknowledged_error_count = self.acknowledged_error_count.saturating_add(1);
        }
        self
    }

    /// Resolve an error.
    ///
    /// Counter bookkeeping is decided from the record as it was before this
    /// call: resolving a critical record twice decrements the critical count
    /// twice. Counts never go below zero.
    pub fn resolve(mut self, id: &str) -> Self {
        let previous = match self.find(id) {
            Some(record) => record.clone(),
            None => return self,
        };

        for record in self.errors.iter_mut().filter(|e| e.id == id) {
            record.state = ErrorState::Resolved;
        }

        if previous.is_critical() {
            self.critical_error_count = self.critical_error_count.saturating_sub(1);
        }
        if previous.state == ErrorState::Acknowledged {
            self.acknowledged_error_count = self.acknowledged_error_count.saturating_sub(1);
        }
        self
    }

    /// Drop resolved records from the log
    pub fn clear_resolved(mut self) -> Self {
        self.errors.retain(|e| e.state != ErrorState::Resolved);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::records::Severity;

    fn critical(id: &str) -> ErrorRecord {
        ErrorRecord::new(id, Severity::Critical, "KUKA Robot")
    }

    fn warning(id: &str) -> ErrorRecord {
        ErrorRecord::new(id, Severity::Warning, "Conveyor 1")
    }

    #[test]
    fn test_initial_status_is_active() {
        let status = SystemStatus::new();
        assert!(status.is_running);
        assert_eq!(status.state, RunState::Active);
        assert!(status.can_produce());
    }

    #[test]
    fn test_stop_then_start() {
        let status = SystemStatus::new().stop();
        assert!(!status.is_running);
        assert_eq!(status.state, RunState::Idle);
        assert!(!status.can_produce());

        let status = status.start();
        assert!(status.is_running);
        assert_eq!(status.state, RunState::Active);
    }

    #[test]
    fn test_emergency_stop_from_any_state() {
        let states = [
            SystemStatus::new(),
            SystemStatus::new().stop(),
            SystemStatus::new().emergency_stop(),
            SystemStatus::new().report_error(critical("E1")),
        ];

        for status in states {
            let next = status.transition(StatusCommand::EmergencyStop);
            assert_eq!(next.state, RunState::Error);
            assert!(!next.is_running);
        }
    }

    #[test]
    fn test_start_after_emergency_stop_without_errors() {
        let status = SystemStatus::new().emergency_stop().start();
        assert_eq!(status.state, RunState::Active);
        assert!(status.is_running);
    }

    #[test]
    fn test_critical_error_forces_error_state() {
        let status = SystemStatus::new().report_error(critical("E1"));
        assert_eq!(status.state, RunState::Error);
        assert!(!status.is_running);
        assert_eq!(status.critical_error_count, 1);
        assert_eq!(status.active_critical_errors(), 1);
    }

    #[test]
    fn test_warning_does_not_stop_line() {
        let status = SystemStatus::new().report_error(warning("W1"));
        assert_eq!(status.state, RunState::Active);
        assert!(status.is_running);
        assert_eq!(status.critical_error_count, 0);
        assert_eq!(status.errors.len(), 1);
    }

    #[test]
    fn test_errors_are_newest_first() {
        let status = SystemStatus::new()
            .report_error(warning("W1"))
            .report_error(warning("W2"));
        assert_eq!(status.errors[0].id, "W2");
        assert_eq!(status.errors[1].id, "W1");
    }

    #[test]
    fn test_start_ignored_with_outstanding_critical() {
        let status = SystemStatus::new().report_error(critical("E1"));
        let next = status.clone().start();
        assert_eq!(next, status);
    }

    #[test]
    fn test_acknowledge_and_resolve() {
        let status = SystemStatus::new()
            .report_error(critical("E1"))
            .acknowledge("E1");
        assert_eq!(status.acknowledged_error_count, 1);
        assert_eq!(status.find("E1").unwrap().state, ErrorState::Acknowledged);
        assert_eq!(status.active_critical_errors(), 0);

        let status = status.resolve("E1");
        assert_eq!(status.critical_error_count, 0);
        assert_eq!(status.acknowledged_error_count, 0);
        assert_eq!(status.find("E1").unwrap().state, ErrorState::Resolved);
        // Resolving does not restart the line
        assert_eq!(status.state, RunState::Error);

        let status = status.start();
        assert_eq!(status.state, RunState::Active);
    }

    #[test]
    fn test_acknowledge_counts_every_call() {
        let status = SystemStatus::new()
            .report_error(warning("W1"))
            .acknowledge("W1")
            .acknowledge("W1");
        assert_eq!(status.acknowledged_error_count, 2);
        assert_eq!(status.find("W1").unwrap().state, ErrorState::Acknowledged);
    }

    #[test]
    fn test_acknowledge_reopens_resolved_record() {
        let status = SystemStatus::new().report_error(warning("W1")).resolve("W1");
        assert_eq!(status.find("W1").unwrap().state, ErrorState::Resolved);
        assert_eq!(status.acknowledged_error_count, 0);

        let status = status.acknowledge("W1");
        assert_eq!(status.find("W1").unwrap().state, ErrorState::Acknowledged);
        assert_eq!(status.acknowledged_error_count, 1);
    }

    #[test]
    fn test_loaded_error_log_is_not_counted() {
        let status = SystemStatus::new().with_error_log(vec![critical("E1"), warning("W1")]);
        assert_eq!(status.errors.len(), 2);
        assert_eq!(status.critical_error_count, 0);
        assert_eq!(status.state, RunState::Active);
        assert!(status.can_produce());
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let status = SystemStatus::new().report_error(critical("E1"));
        let after = status.clone().acknowledge("nope").resolve("nope");
        assert_eq!(after, status);
    }

    #[test]
    fn test_resolve_twice_is_clamped() {
        let status = SystemStatus::new()
            .report_error(critical("E1"))
            .acknowledge("E1")
            .resolve("E1")
            .resolve("E1");
        assert_eq!(status.critical_error_count, 0);
        assert_eq!(status.acknowledged_error_count, 0);
    }

    #[test]
    fn test_resolve_twice_reads_previous_record() {
        // Two outstanding critical errors; resolving the same one twice
        // consumes both counts.
        let status = SystemStatus::new()
            .report_error(critical("E1"))
            .report_error(critical("E2"))
            .resolve("E1")
            .resolve("E1");
        assert_eq!(status.critical_error_count, 0);
        assert_eq!(status.find("E2").unwrap().state, ErrorState::Active);
    }

    #[test]
    fn test_clear_resolved() {
        let status = SystemStatus::new()
            .report_error(warning("W1"))
            .report_error(warning("W2"))
            .resolve("W1")
            .clear_resolved();
        assert_eq!(status.errors.len(), 1);
        assert_eq!(status.errors[0].id, "W2");
    }
}

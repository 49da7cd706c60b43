use super::machine::{StatusCommand, SystemStatus};
use super::records::ErrorRecord;
use log::{debug, info, warn};

/// Observer trait for status transitions
pub trait StatusObserver {
    /// Called after every command, before the command returns
    fn on_transition(
        &mut self,
        before: &SystemStatus,
        command: &StatusCommand,
        after: &SystemStatus,
    );
}

/// Single source of truth for the line status.
///
/// Owned by whoever drives the line and handed to consumers by reference.
/// All mutation goes through `apply`, which notifies subscribed observers
/// synchronously.
pub struct StatusStore {
    status: SystemStatus,
    observers: Vec<Box<dyn StatusObserver>>,
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusStore {
    /// Create a store in the application start state
    pub fn new() -> Self {
        Self::with_status(SystemStatus::new())
    }

    /// Create a store from an existing status
    pub fn with_status(status: SystemStatus) -> Self {
        Self {
            status,
            observers: Vec::new(),
        }
    }

    /// Current status snapshot
    pub fn status(&self) -> &SystemStatus {
        &self.status
    }

    /// Subscribe an observer to every subsequent transition
    pub fn subscribe(&mut self, observer: Box<dyn StatusObserver>) {
        self.observers.push(observer);
    }

    /// Apply a command and notify observers
    pub fn apply(&mut self, command: StatusCommand) -> &SystemStatus {
        let before = self.status.clone();
        let after = before.clone().transition(command.clone());

        if before.state != after.state {
            info!("line status {} -> {} ({})", before.state, after.state, command.name());
        } else {
            debug!("{} left line status at {}", command.name(), after.state);
        }
        if let StatusCommand::ReportError(record) = &command {
            if record.is_critical() {
                warn!(
                    "critical error {} from {}: {}",
                    record.id, record.component, record.description
                );
            }
        }

        for observer in &mut self.observers {
            observer.on_transition(&before, &command, &after);
        }
        self.status = after;
        &self.status
    }

    pub fn start(&mut self) -> &SystemStatus {
        self.apply(StatusCommand::Start)
    }

    pub fn stop(&mut self) -> &SystemStatus {
        self.apply(StatusCommand::Stop)
    }

    pub fn emergency_stop(&mut self) -> &SystemStatus {
        self.apply(StatusCommand::EmergencyStop)
    }

    pub fn report_error(&mut self, record: ErrorRecord) -> &SystemStatus {
        self.apply(StatusCommand::ReportError(record))
    }

    pub fn acknowledge(&mut self, id: &str) -> &SystemStatus {
        self.apply(StatusCommand::Acknowledge(id.to_string()))
    }

    pub fn resolve(&mut self, id: &str) -> &SystemStatus {
        self.apply(StatusCommand::Resolve(id.to_string()))
    }

    pub fn clear_resolved(&mut self) -> &SystemStatus {
        self.apply(StatusCommand::ClearResolved)
    }
}

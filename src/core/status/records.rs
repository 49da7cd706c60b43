use serde::{Deserialize, Serialize};

/// Error severity. Only `Critical` has a systemic effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Warning, Severity::Info];

    pub fn is_critical(&self) -> bool {
        matches!(self, Severity::Critical)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Info => write!(f, "Info"),
        }
    }
}

/// Handling state of a logged error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorState {
    Active,
    Acknowledged,
    Resolved,
}

impl std::fmt::Display for ErrorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorState::Active => write!(f, "Active"),
            ErrorState::Acknowledged => write!(f, "Acknowledged"),
            ErrorState::Resolved => write!(f, "Resolved"),
        }
    }
}

/// Role of the person operating the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorRole {
    Operator,
    Maintenance,
    Admin,
}

impl OperatorRole {
    /// Only maintenance staff may mark errors resolved
    pub fn can_resolve(&self) -> bool {
        matches!(self, OperatorRole::Maintenance)
    }
}

impl std::fmt::Display for OperatorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperatorRole::Operator => write!(f, "Operator"),
            OperatorRole::Maintenance => write!(f, "Maintenance"),
            OperatorRole::Admin => write!(f, "Admin"),
        }
    }
}

/// Entry in the error log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub id: String,
    pub timestamp: String,
    pub severity: Severity,
    /// Line component that raised the error, e.g. "Conveyor 1"
    pub component: String,
    pub code: String,
    pub description: String,
    #[serde(rename = "status")]
    pub state: ErrorState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl ErrorRecord {
    /// Create a new active error record
    pub fn new(id: impl Into<String>, severity: Severity, component: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: String::new(),
            severity,
            component: component.into(),
            code: String::new(),
            description: String::new(),
            state: ErrorState::Active,
            instructions: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_state(mut self, state: ErrorState) -> Self {
        self.state = state;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity.is_critical()
    }
}

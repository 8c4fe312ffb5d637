use thiserror::Error;

/// Why loading an external unit failed. Each variant becomes one fatal line in the
/// output log and moves the bridge to `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The artifact at the load location could not be fetched.
    #[error("Failed to load unit {location}. {detail}")]
    NetworkFailure { location: String, detail: String },
    /// The artifact was fetched but did not produce a usable instance.
    #[error("Instantiation failed for {location}. {detail}")]
    InstantiationFailure { location: String, detail: String },
    /// The artifact does not expose the expected factory shape.
    #[error("Unit factory not found for {location}. {detail}")]
    MalformedFactory { location: String, detail: String },
}

impl LoadError {
    pub fn network(location: impl Into<String>, detail: impl ToString) -> Self {
        Self::NetworkFailure {
            location: location.into(),
            detail: detail.to_string(),
        }
    }

    pub fn instantiation(location: impl Into<String>, detail: impl ToString) -> Self {
        Self::InstantiationFailure {
            location: location.into(),
            detail: detail.to_string(),
        }
    }

    pub fn malformed(location: impl Into<String>, detail: impl ToString) -> Self {
        Self::MalformedFactory {
            location: location.into(),
            detail: detail.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::NetworkFailure { .. } => "network_failure",
            LoadError::InstantiationFailure { .. } => "instantiation_failure",
            LoadError::MalformedFactory { .. } => "malformed_factory",
        }
    }
}

/// A fault raised by a loaded unit while executing one of its capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitFault {
    #[error("{0}")]
    Raised(String),
    #[error("unit is no longer running")]
    Disconnected,
    #[error("unit io: {0}")]
    Io(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Start,
    Input,
}

/// Invocation failures. None of these change bridge state; the UI stays interactable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    #[error("[{program}] No suitable init function ('{entry}' or 'main') found on unit.")]
    MissingStartEntry { program: String, entry: String },
    #[error("[{program}] Input handling function '{entry}' not found on unit.")]
    MissingInputEntry { program: String, entry: String },
    #[error("Please type an input before sending.")]
    EmptyInput,
    #[error("{}", call_exception_line(.kind, .fault))]
    CallException { kind: EntryKind, fault: UnitFault },
    #[error("[{program}] Unit not ready. Status: {status}")]
    NotReady { program: String, status: String },
}

impl InvocationError {
    pub fn is_missing_entry_point(&self) -> bool {
        matches!(
            self,
            InvocationError::MissingStartEntry { .. } | InvocationError::MissingInputEntry { .. }
        )
    }
}

fn call_exception_line(kind: &EntryKind, fault: &UnitFault) -> String {
    match kind {
        EntryKind::Start => format!("Error: {fault}"),
        EntryKind::Input => format!("Error sending input: {fault}"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/error.rs"]
mod tests;

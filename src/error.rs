use thiserror::Error;

// ---------------------------------------------------------------------------
// User-facing error kinds
// ---------------------------------------------------------------------------

/// No table could be obtained for this cycle. Halts the main area.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DataUnavailable {
    /// Headline shown to the user.
    pub message: String,
    /// Underlying cause (missing file, parse failure, …).
    pub reason: String,
}

impl DataUnavailable {
    pub fn new(message: impl Into<String>, reason: &anyhow::Error) -> Self {
        DataUnavailable {
            message: message.into(),
            reason: format!("{reason:#}"),
        }
    }
}

/// A failure raised while running a custom script. Shown inline only.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Error running code: {message}")]
pub struct ExecutionError {
    pub message: String,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        ExecutionError {
            message: message.into(),
        }
    }
}

//! Error types for the hyttebok ecosystem.

use std::fmt;

use thiserror::Error;

/// Errors that can occur in hyttebok operations.
#[derive(Error, Debug)]
pub enum HyttebokError {
    /// A booking draft failed validation. Local and non-fatal.
    #[error("Invalid booking: {0}")]
    Validation(ValidationError),

    /// The durable value exists but is not a well-formed booking collection.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// A write to the durable store failed.
    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for hyttebok operations.
pub type HyttebokResult<T> = Result<T, HyttebokError>;

/// Field-level problems found while validating a booking draft.
///
/// Every failing field is reported at once so a form can highlight
/// all of them in a single round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

/// One invalid or missing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    /// Names of every field that failed.
    pub fn fields(&self) -> Vec<&'static str> {
        self.issues.iter().map(|issue| issue.field).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .issues
            .iter()
            .map(|issue| format!("{} {}", issue.field, issue.reason))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<ValidationError> for HyttebokError {
    fn from(err: ValidationError) -> Self {
        HyttebokError::Validation(err)
    }
}

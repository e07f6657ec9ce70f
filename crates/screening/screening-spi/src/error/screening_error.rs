//! Screening error types.

use thiserror::Error;

/// Transaction screening errors.
#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("invalid value for {field}: '{value}' ({reason})")]
    InvalidField {
        field: String,
        value: String,
        reason: String,
    },

    #[error("missing form field: {0}")]
    MissingField(String),

    #[error("cannot read artifact {path}: {reason}")]
    Artifact { path: String, reason: String },

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("model fetch failed: {0}")]
    Fetch(String),

    #[error("feature mismatch: expected {expected:?}, got {got:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("prediction failed: {0}")]
    Prediction(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ScreeningError {
    /// Build an [`ScreeningError::InvalidField`] from any parse error.
    pub fn invalid_field(field: &str, value: &str, reason: impl ToString) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build an [`ScreeningError::Artifact`] for a file path.
    pub fn artifact(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        Self::Artifact {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error comes from user input that can be reported inline.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidField { .. })
    }
}

/// Result type for screening operations.
pub type Result<T> = std::result::Result<T, ScreeningError>;

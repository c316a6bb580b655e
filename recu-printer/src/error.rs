//! Error types for the receipt library
//!
//! Encoding problems never show up here: the safe encoder absorbs them.
//! Only structural problems with the receipt payload (and the outer
//! configuration/IO layer) are reported as errors.

use thiserror::Error;

/// Structurally invalid receipt input
#[derive(Debug, Error)]
pub enum FormattingError {
    /// A field holds a value the layout cannot work with
    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    /// The payload does not match the receipt shape (e.g. non-numeric price)
    #[error("Malformed receipt payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

impl FormattingError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Printer library error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Receipt could not be formatted
    #[error("Formatting failed: {0}")]
    Formatting(#[from] FormattingError),

    /// Invalid printer or policy configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// IO error while handing the buffer off
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for document building
pub type FormatResult<T> = Result<T, FormattingError>;

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;

//! Error types for the analysis sections and the input gateway.

use thiserror::Error;

/// A failure recorded inside one section of the report.
///
/// The `Display` text is what ends up in the section's `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    /// The input is not syntactically valid JSON.
    #[error("JSON parse error: {message}")]
    JsonParse { message: String },

    /// The document nests deeper than the traversal is allowed to go.
    #[error("JSON depth limit exceeded (max {limit})")]
    JsonDepthLimit { limit: usize },

    /// The section panicked while running.
    #[error("{section} analysis failed unexpectedly: {message}")]
    Fault {
        section: &'static str,
        message: String,
    },

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

/// Input rejected before any analysis runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Input text must not be empty")]
    EmptyInput,

    #[error("Input is {actual} characters long, exceeding the maximum of {max} characters")]
    InputTooLong { max: usize, actual: usize },

    #[error("Missing required string parameter 'input'")]
    MissingInput,
}

pub type SectionResult<T> = Result<T, SectionError>;

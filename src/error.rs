//! Error handling for the RFP aligner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RfpAlignerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format: {0}. Please upload a PDF, DOCX, or TXT file")]
    UnsupportedFormat(String),

    #[error("Failed to parse {format} document: {cause}")]
    ParseFailure { format: String, cause: String },

    #[error("Document text is too short to analyze ({actual} characters, need at least {minimum})")]
    InputTooShort { actual: usize, minimum: usize },

    /// Never produced: scoring substitutes neutral defaults for empty input.
    #[error("Invalid scoring input: {0}")]
    ScoringInputInvalid(String),

    #[error("Extraction service error: {0}")]
    Service(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, RfpAlignerError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for RfpAlignerError {
    fn from(err: anyhow::Error) -> Self {
        RfpAlignerError::InvalidInput(err.to_string())
    }
}

impl RfpAlignerError {
    pub fn parse_failure(format: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        RfpAlignerError::ParseFailure {
            format: format.into(),
            cause: cause.to_string(),
        }
    }

    /// Whether the end user can fix this by supplying a different document
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            RfpAlignerError::UnsupportedFormat(_)
                | RfpAlignerError::ParseFailure { .. }
                | RfpAlignerError::InputTooShort { .. }
        )
    }
}

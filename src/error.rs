//! Error types for kreuzberg-flow components.

use std::io;
use thiserror::Error;

/// Result type alias for kreuzberg-flow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading or extracting documents.
///
/// Component variants carry an optional hint that tells the user how to
/// fix the input; hosts surface it next to the message.
#[derive(Error, Debug)]
pub enum Error {
    /// Generic component failure.
    #[error("{message}")]
    Component {
        message: String,
        hint: Option<String>,
    },

    /// The input document format is not supported.
    #[error("{message}")]
    UnsupportedFormat {
        message: String,
        hint: Option<String>,
    },

    /// OCR was requested with a backend that is not available.
    #[error("{message}")]
    OcrBackendMissing {
        message: String,
        hint: Option<String>,
    },

    /// Document bytes are missing, empty or cannot be parsed.
    #[error("{message}")]
    CorruptDocument {
        message: String,
        hint: Option<String>,
    },

    /// Extraction exceeded the configured timeout.
    #[error("{message}")]
    ExtractionTimeout {
        message: String,
        hint: Option<String>,
    },

    /// A remote extraction dependency failed.
    #[error("{message}")]
    RemoteExtraction {
        message: String,
        hint: Option<String>,
    },

    /// Caller supplied an invalid argument.
    #[error("{0}")]
    InvalidArgument(String),

    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Payload (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Base component error.
    pub fn component(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Error::Component {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn unsupported_format(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Error::UnsupportedFormat {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn ocr_backend_missing(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Error::OcrBackendMissing {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn corrupt_document(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Error::CorruptDocument {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn extraction_timeout(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Error::ExtractionTimeout {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn remote_extraction(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Error::RemoteExtraction {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Actionable hint for the user, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Error::Component { hint, .. }
            | Error::UnsupportedFormat { hint, .. }
            | Error::OcrBackendMissing { hint, .. }
            | Error::CorruptDocument { hint, .. }
            | Error::ExtractionTimeout { hint, .. }
            | Error::RemoteExtraction { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }

    /// Short, stable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Component { .. } => "component",
            Error::UnsupportedFormat { .. } => "unsupported_format",
            Error::OcrBackendMissing { .. } => "ocr_backend_missing",
            Error::CorruptDocument { .. } => "corrupt_document",
            Error::ExtractionTimeout { .. } => "extraction_timeout",
            Error::RemoteExtraction { .. } => "remote_extraction",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }

    /// Whether this error belongs to the component taxonomy (as opposed to
    /// plumbing failures such as I/O).
    pub fn is_component_error(&self) -> bool {
        !matches!(
            self,
            Error::InvalidArgument(_) | Error::Io(_) | Error::Json(_)
        )
    }
}

//! Error types for parsing and binding.
//!
//! Lexical and structural errors abort the whole parse. Binding errors
//! abort only the record being bound; see [`Error::is_binding`].

use thiserror::Error;

use crate::value::ParseDecimalError;

/// Main error type for tagbind operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Lexically invalid input: bare `<`/`&`, unterminated tag, bad name, ...
    #[error("malformed markup at byte {position}: {reason}")]
    MalformedMarkup { reason: String, position: usize },

    /// A closing tag that does not match the innermost open element.
    #[error(
        "unbalanced element at byte {position}: found </{found}>, expected {}",
        .expected.as_deref().map_or_else(|| "no closing tag".to_string(), |name| format!("</{name}>"))
    )]
    UnbalancedElement {
        expected: Option<String>,
        found: String,
        position: usize,
    },

    /// Input ended while elements were still open.
    #[error("unexpected end of input at byte {position}: unclosed {open:?}")]
    UnexpectedEof { open: Vec<String>, position: usize },

    /// Zero or several root elements, or text outside the root.
    #[error("invalid document structure at byte {position}: {reason}")]
    InvalidDocumentStructure { reason: String, position: usize },

    /// A required field had no matching element or attribute.
    #[error("missing required field '{field}'")]
    MissingRequiredField { field: String },

    /// A decoder (custom or built-in coercion) rejected the raw text.
    #[error("failed to decode field '{field}' from {raw_text:?}: {cause}")]
    FieldDecodeError {
        field: String,
        raw_text: String,
        #[source]
        cause: DecodeError,
    },

    /// A non-list field matched more than once under `DuplicatePolicy::Reject`.
    #[error("duplicate value for field '{field}'")]
    DuplicateField { field: String },

    /// A child element with no field spec, with unknown fields denied.
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// Schema id not defined in the registry.
    #[error("unknown schema '{0}'")]
    UnknownSchema(String),

    /// IO error while draining the input stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors that abort only the current record.
    pub fn is_binding(&self) -> bool {
        matches!(
            self,
            Error::MissingRequiredField { .. }
                | Error::FieldDecodeError { .. }
                | Error::DuplicateField { .. }
                | Error::UnknownField { .. }
        )
    }

    /// Byte offset in the input, for lexical and structural errors.
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::MalformedMarkup { position, .. }
            | Error::UnbalancedElement { position, .. }
            | Error::UnexpectedEof { position, .. }
            | Error::InvalidDocumentStructure { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>, position: usize) -> Self {
        Error::MalformedMarkup {
            reason: reason.into(),
            position,
        }
    }

    pub(crate) fn structure(reason: impl Into<String>, position: usize) -> Self {
        Error::InvalidDocumentStructure {
            reason: reason.into(),
            position,
        }
    }
}

/// Failure converting a field's raw text into a value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("invalid integer: {0}")]
    InvalidInteger(#[from] std::num::ParseIntError),

    #[error("invalid decimal: {0}")]
    InvalidDecimal(#[from] ParseDecimalError),

    #[error("invalid boolean: expected true, false, 1 or 0")]
    InvalidBoolean,

    #[error("invalid date: {0}")]
    InvalidDate(#[from] chrono::ParseError),

    /// Free-form failure reported by a custom decoder.
    #[error("{0}")]
    Custom(String),
}

impl DecodeError {
    pub fn custom(message: impl Into<String>) -> Self {
        DecodeError::Custom(message.into())
    }
}

/// Result type alias for tagbind operations
pub type Result<T> = std::result::Result<T, Error>;

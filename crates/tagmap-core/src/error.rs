//! Error types for the tagmap engine
//!
//! Every failure of a mapping call surfaces as an [`Error`]. Validator causes are
//! carried as `anyhow::Error` so registered functions can fail with any error type.

use crate::codec::CodecError;
use crate::value::ConversionError;
use thiserror::Error;

/// Main error type for mapping operations
#[derive(Error, Debug)]
pub enum Error {
    /// Inputs are not the composite records (or sequences) an operation requires
    #[error("Precondition failed: {message}")]
    Precondition { message: String },

    /// A validator rejected a field value
    #[error("validation failed for field '{field}': {source}")]
    Validation {
        field: String,
        validator: String,
        #[source]
        source: anyhow::Error,
    },

    /// A tag references a validator missing from the registry
    #[error("validator '{name}' not found")]
    ValidatorNotFound { name: String, field: String },

    /// A tag references a transformer missing from the registry
    #[error("transformer '{name}' not found")]
    TransformerNotFound { name: String, field: String },

    /// Serialized text could not be decoded into the destination shape
    #[error("failed to decode '{field}': {source}")]
    Decode {
        field: String,
        #[source]
        source: CodecError,
    },

    /// A value could not be assigned to the destination slot
    #[error("cannot assign to '{field}': {source}")]
    Conversion {
        field: String,
        #[source]
        source: ConversionError,
    },

    /// Nested records went deeper than the configured limit
    #[error("maximum nesting depth {limit} exceeded at '{field}'")]
    DepthExceeded { field: String, limit: usize },

    /// The inline pipeline specification of the single-value helper is malformed
    #[error("invalid inline pipeline spec at offset {position}: {message}")]
    InlineSpec { message: String, position: usize },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error is a validator rejection
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// The logical field (or path) the error is attached to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. }
            | Error::ValidatorNotFound { field, .. }
            | Error::TransformerNotFound { field, .. }
            | Error::Decode { field, .. }
            | Error::Conversion { field, .. }
            | Error::DepthExceeded { field, .. } => Some(field),
            Error::Precondition { .. } | Error::InlineSpec { .. } => None,
        }
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Error::Precondition {
            message: message.into(),
        }
    }
}

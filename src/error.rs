//! Error types for the ODBC data-representation core.

use thiserror::Error;

/// Result type alias for driver-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for driver-core operations.
///
/// Malformed type strings and malformed text never show up here: both are
/// recovered locally (generic `String` classification, U+FFFD substitution).
/// What remains are caller contract violations and configuration mistakes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A result-set row is missing a protocol-mandated field.
    #[error("Row has no field at position {position} (row width: {width})")]
    MissingField { position: usize, width: usize },

    /// A field holds a value of the wrong kind for its position.
    #[error("Field at position {position} has kind {actual}, expected {expected}")]
    FieldKindMismatch {
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// A backend type string could not be parsed.
    #[error("Cannot parse type '{input}' at offset {offset}: {message}")]
    TypeParse {
        input: String,
        offset: usize,
        message: String,
    },

    /// A configuration value could not be interpreted.
    #[error("Invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },
}

impl Error {
    /// Create a type parse error.
    pub fn type_parse(input: impl Into<String>, offset: usize, message: impl Into<String>) -> Self {
        Self::TypeParse {
            input: input.into(),
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
        }
    }
}

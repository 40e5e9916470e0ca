//! Validation Error Types

use thiserror::Error;

/// A rejected settings key
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value could not be read as a number
    #[error("{key}: expected a number, got {value}")]
    NotNumeric { key: &'static str, value: String },

    /// Value is numeric but not a whole number of seconds
    #[error("{key}: expected a whole number, got {value}")]
    NotInteger { key: &'static str, value: String },

    /// Value out of allowed range
    #[error("{key} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        key: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// JSON value of the wrong kind (e.g. an object for a threshold)
    #[error("{key}: expected {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },
}

impl ValidationError {
    /// The settings key this error refers to
    pub fn key(&self) -> &'static str {
        match self {
            ValidationError::NotNumeric { key, .. }
            | ValidationError::NotInteger { key, .. }
            | ValidationError::OutOfRange { key, .. }
            | ValidationError::WrongType { key, .. } => key,
        }
    }
}

//! Error types for the domain layer.

use thiserror::Error;

/// Errors raised when a value object or state change fails validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_displays_field_name() {
        let err = ValidationError::empty_field("text");
        assert_eq!(err.to_string(), "Field 'text' cannot be empty");
    }

    #[test]
    fn out_of_range_displays_bounds() {
        let err = ValidationError::out_of_range("version", 1, i64::from(u32::MAX), 0);
        assert_eq!(
            err.to_string(),
            "Field 'version' must be between 1 and 4294967295, got 0"
        );
    }

    #[test]
    fn invalid_format_displays_reason() {
        let err = ValidationError::invalid_format("state_transition", "Complete is terminal");
        assert_eq!(
            err.to_string(),
            "Field 'state_transition' has invalid format: Complete is terminal"
        );
    }

    #[test]
    fn field_accessor_returns_field_for_every_variant() {
        assert_eq!(ValidationError::empty_field("a").field(), "a");
        assert_eq!(ValidationError::out_of_range("b", 0, 1, 2).field(), "b");
        assert_eq!(ValidationError::invalid_format("c", "x").field(), "c");
    }
}

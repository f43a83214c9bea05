//! Error types for sandbox operations

use thiserror::Error;

/// Raised when an absent optional is forcibly unwrapped.
///
/// This is the only failure `force_unwrap` can report.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Absent value: expected a present {expected}")]
pub struct AbsentValueError {
    /// Name of the type the caller expected to find
    pub expected: &'static str,
}

impl AbsentValueError {
    /// Create an error for an absent `T`.
    pub fn of<T>() -> Self {
        Self {
            expected: std::any::type_name::<T>(),
        }
    }
}

/// Main error type for the sandbox
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SandboxError {
    /// An optional was forced while absent
    #[error(transparent)]
    AbsentValue(#[from] AbsentValueError),

    /// A field that the entity was not constructed with
    #[error("Unknown field `{field}` on {type_name}")]
    UnknownField {
        /// Type name of the record or handle
        type_name: String,
        /// The requested field
        field: String,
    },

    /// The global configuration was already installed
    #[error("Sandbox configuration is already installed")]
    ConfigInstalled,

    /// A global tracing subscriber could not be installed
    #[error("Logging error: {0}")]
    Logging(String),
}

impl SandboxError {
    /// Create an unknown field error.
    pub fn unknown_field(type_name: impl Into<String>, field: impl Into<String>) -> Self {
        SandboxError::UnknownField {
            type_name: type_name.into(),
            field: field.into(),
        }
    }
}

/// Result type alias for sandbox operations
pub type Result<T> = std::result::Result<T, SandboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_value_names_type() {
        let err = AbsentValueError::of::<i64>();
        assert_eq!(err.expected, "i64");
        assert_eq!(err.to_string(), "Absent value: expected a present i64");
    }

    #[test]
    fn test_absent_value_converts() {
        let err: SandboxError = AbsentValueError::of::<String>().into();
        assert!(matches!(err, SandboxError::AbsentValue(_)));
    }

    #[test]
    fn test_unknown_field_message() {
        let err = SandboxError::unknown_field("Size", "depth");
        assert_eq!(err.to_string(), "Unknown field `depth` on Size");
    }
}

//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// These are contract violations: malformed input, commands addressed to the
/// wrong aggregate, histories that cannot be replayed. Business outcomes such as
/// a rejected confirmation are events, not errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A required field was absent or blank.
    #[error("required field is missing: {0}")]
    MissingField(&'static str),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A conflict occurred (e.g. a history that registers the same aggregate twice).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField(field)
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

/// Reject absent or whitespace-only input for a required field.
///
/// Returns the input unchanged when present.
pub fn require<'a>(field: &'static str, value: Option<&'a str>) -> DomainResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DomainError::missing_field(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_absent_and_blank_values() {
        assert_eq!(
            require("email_address", None),
            Err(DomainError::MissingField("email_address"))
        );
        assert_eq!(
            require("email_address", Some("  ")),
            Err(DomainError::MissingField("email_address"))
        );
        assert_eq!(require("email_address", Some("a@b.io")), Ok("a@b.io"));
    }

    #[test]
    fn missing_field_message_names_the_field() {
        let err = DomainError::missing_field("confirmation_hash");
        assert_eq!(err.to_string(), "required field is missing: confirmation_hash");
    }
}

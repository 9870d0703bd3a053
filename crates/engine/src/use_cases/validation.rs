//! Common validation helpers for request input.
//!
//! Everything here runs before any provider call, so a bad request never
//! costs a generation.

use claimdesk_domain::Difficulty;

/// Validation error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field_name} is required")]
    Missing { field_name: &'static str },

    #[error("{field_name} cannot be empty")]
    Empty { field_name: &'static str },

    #[error("{field_name} is invalid: {reason}")]
    Invalid { field_name: &'static str, reason: String },
}

/// Require an optional field to be present.
pub fn require_present<T>(value: Option<T>, field_name: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::Missing { field_name })
}

/// Validate a string is non-empty after trimming.
pub fn require_non_empty(value: &str, field_name: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field_name });
    }
    Ok(())
}

/// Parse a required difficulty. Missing and unknown values are both errors;
/// there is no default difficulty.
pub fn require_difficulty(value: Option<&str>) -> Result<Difficulty, ValidationError> {
    let raw = require_present(value, "difficulty")?;
    raw.parse().map_err(|e: claimdesk_domain::DomainError| ValidationError::Invalid {
        field_name: "difficulty",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_present() {
        assert_eq!(require_present(Some(1), "n"), Ok(1));
        assert_eq!(
            require_present::<i32>(None, "n"),
            Err(ValidationError::Missing { field_name: "n" })
        );
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("x", "complaint").is_ok());
        assert_eq!(
            require_non_empty("  ", "complaint"),
            Err(ValidationError::Empty {
                field_name: "complaint"
            })
        );
    }

    #[test]
    fn test_require_difficulty() {
        assert_eq!(require_difficulty(Some("crazy")), Ok(Difficulty::Crazy));
        assert!(matches!(
            require_difficulty(None),
            Err(ValidationError::Missing { .. })
        ));
        assert!(matches!(
            require_difficulty(Some("hard")),
            Err(ValidationError::Invalid { field_name: "difficulty", .. })
        ));
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let err = require_difficulty(Some("hard")).unwrap_err();
        assert!(err.to_string().starts_with("difficulty is invalid"));
    }
}

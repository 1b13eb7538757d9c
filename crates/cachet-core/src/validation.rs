//! Validation utilities.

use crate::{CachetError, FieldError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `CachetError` on failure.
    fn validate_request(&self) -> Result<(), CachetError> {
        self.validate().map_err(validation_errors_to_cachet_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator` errors into field errors, sorted by field name.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Converts `validator::ValidationErrors` to `CachetError`.
#[must_use]
pub fn validation_errors_to_cachet_error(errors: ValidationErrors) -> CachetError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    CachetError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Signup {
        #[validate(custom(function = "rules::not_blank", message = "must not be blank"))]
        name: String,
    }

    #[test]
    fn test_not_blank_rule() {
        assert!(rules::not_blank("x").is_ok());
        assert!(rules::not_blank("   ").is_err());
        assert!(rules::not_blank("").is_err());
    }

    #[test]
    fn test_validate_request_maps_to_validation_error() {
        let signup = Signup {
            name: " ".to_string(),
        };
        let err = signup.validate_request().unwrap_err();
        match err {
            CachetError::Validation(msg) => assert_eq!(msg, "name: must not be blank"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }
}

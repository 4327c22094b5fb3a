//! Request validation helpers shared by the handlers.
//!
//! Payload types implement [`RequestValidation`]; handlers call `validate()`
//! before touching the service layer so malformed bodies fail fast with a
//! consistent 400.

use crate::error::ApiError;

pub trait RequestValidation {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Validate a field against a predicate.
///
/// ```ignore
/// validate_field!(self.duration, self.duration > 0, "`duration` must be positive");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Validate that a string field is present and non-blank.
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        if $field.trim().is_empty() {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        name: String,
    }

    impl RequestValidation for Probe {
        fn validate(&self) -> Result<(), ApiError> {
            validate_required!(self.name, "`name` is required");
            Ok(())
        }
    }

    #[test]
    fn blank_fields_fail_validation() {
        let blank = Probe {
            name: "   ".to_string(),
        };
        assert!(matches!(blank.validate(), Err(ApiError::Validation(_))));

        let ok = Probe {
            name: "reader".to_string(),
        };
        assert!(ok.validate().is_ok());
    }
}

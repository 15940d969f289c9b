use chrono::{DateTime, Utc};
use validator::{Validate, ValidationErrors};

use crate::error::{VmsError, VmsResult};

pub fn validate_model<T: Validate>(model: &T) -> VmsResult<()> {
    model.validate().map_err(VmsError::from)
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
    field_errors.sort_by_key(|(field, _)| *field);

    let mut messages = Vec::new();
    for (field, field_errors) in field_errors {
        for error in field_errors {
            if let Some(message) = &error.message {
                messages.push(message.to_string());
                continue;
            }
            let message = match &error.code {
                std::borrow::Cow::Borrowed("length") => {
                    format!("Length validation failed for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("range") => {
                    format!("Value out of range for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("required") => {
                    format!("Field '{}' is required", field)
                }
                _ => format!("Validation failed for field '{}': {}", field, error.code),
            };
            messages.push(message);
        }
    }

    messages.join(", ")
}

/// Rejects `value` when it falls before `bound`.
pub fn validate_not_before(
    field: &str,
    value: DateTime<Utc>,
    bound_name: &str,
    bound: DateTime<Utc>,
) -> VmsResult<()> {
    if value < bound {
        return Err(VmsError::validation(
            field,
            format!("{} must not precede {} ({})", field, bound_name, bound.to_rfc3339()),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1))]
        name: String,
        #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
        quantity: i32,
    }

    #[test]
    fn test_validate_model_collects_messages() {
        let sample = Sample {
            name: String::new(),
            quantity: 0,
        };
        let error = validate_model(&sample).unwrap_err();
        match error {
            VmsError::Validation { field, message } => {
                assert_eq!(field, "name,quantity");
                assert!(message.contains("Length validation failed for field 'name'"));
                assert!(message.contains("Quantity must be a positive integer"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_not_before() {
        let now = Utc::now();
        assert!(validate_not_before("expected_delivery_date", now, "issue_date", now).is_ok());
        assert!(validate_not_before(
            "expected_delivery_date",
            now - Duration::seconds(1),
            "issue_date",
            now
        )
        .is_err());
    }
}

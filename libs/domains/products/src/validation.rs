//! Field-level validation.
//!
//! Constraints are declared with `validator` derives on the payload types;
//! this module flattens the result into [`FieldViolation`]s. Every field is
//! checked in one pass so callers can report all problems at once.

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{ProductError, ProductResult};

/// A single field that failed its constraint
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field {} {}", self.field, self.message)
    }
}

/// Every violation in `candidate`, sorted by field name. Empty when valid.
///
/// Nested structs report under a dotted path such as `category.name`.
pub fn validate<T: Validate>(candidate: &T) -> Vec<FieldViolation> {
    let Err(errors) = candidate.validate() else {
        return Vec::new();
    };

    let mut violations = Vec::new();
    collect(None, &errors, &mut violations);
    violations.sort();
    violations
}

fn collect(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<FieldViolation>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, field),
            None => field.to_string(),
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| FieldViolation::new(path.clone(), message(e))));
            }
            ValidationErrorsKind::Struct(nested) => collect(Some(&path), nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(Some(&format!("{}[{}]", path, index)), nested, out);
                }
            }
        }
    }
}

fn message(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

/// [`validate`] as a result: `Err(ProductError::Validation)` on any violation.
pub fn ensure_valid<T: Validate>(candidate: &T) -> ProductResult<()> {
    let violations = validate(candidate);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ProductError::Validation(violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryPayload, ProductPayload};

    #[test]
    fn test_valid_payload_has_no_violations() {
        let payload = ProductPayload {
            name: Some("TV".to_string()),
            price: Some(250.0),
            category: Some(Category::new("Electronic")),
            created_at: None,
        };
        assert!(validate(&payload).is_empty());
        assert!(ensure_valid(&payload).is_ok());
    }

    #[test]
    fn test_all_invalid_fields_reported_together() {
        let payload = ProductPayload {
            name: None,
            price: Some(0.0),
            category: None,
            created_at: None,
        };

        let violations = validate(&payload);
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["category", "name", "price"]);
    }

    #[test]
    fn test_empty_name_and_negative_price() {
        let payload = ProductPayload {
            name: Some(String::new()),
            price: Some(-3.5),
            category: Some(Category::new("Sports")),
            created_at: None,
        };

        let violations = validate(&payload);
        assert_eq!(
            violations,
            vec![
                FieldViolation::new("name", "must not be empty"),
                FieldViolation::new("price", "must be greater than 0"),
            ]
        );
    }

    #[test]
    fn test_missing_price_message() {
        let payload = ProductPayload {
            name: Some("Mouse".to_string()),
            price: None,
            category: Some(Category::new("Computing")),
            created_at: None,
        };

        let violations = validate(&payload);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_string(), "field price must not be null");
    }

    #[test]
    fn test_infinite_price_is_not_a_number() {
        let payload = ProductPayload {
            name: Some("TV".to_string()),
            price: Some(f64::INFINITY),
            category: Some(Category::new("Electronic")),
            created_at: None,
        };

        assert_eq!(
            validate(&payload),
            vec![FieldViolation::new("price", "must be a number")]
        );
    }

    #[test]
    fn test_category_name_is_checked_under_dotted_path() {
        let payload = ProductPayload {
            name: Some("TV".to_string()),
            price: Some(250.0),
            category: Some(Category {
                id: Some("c1".to_string()),
                name: String::new(),
            }),
            created_at: None,
        };

        let violations = validate(&payload);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_string(), "field category.name must not be empty");
    }

    #[test]
    fn test_ensure_valid_returns_validation_error() {
        let err = ensure_valid(&CategoryPayload { name: None }).unwrap_err();
        match err {
            ProductError::Validation(v) => assert_eq!(v[0].field, "name"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

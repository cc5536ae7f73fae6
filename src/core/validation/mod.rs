//! Request validation
//!
//! Request models derive [`validator::Validate`]. [`validate`] runs them and
//! turns the nested `validator` report into a flat, sorted list of
//! field/message pairs whose names follow the wire (camelCase) convention,
//! for example `items[0].materialId`.

pub mod validators;

use crate::core::error::{FieldValidationError, ValidationError};
use chrono::NaiveDate;
use uuid::Uuid;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Run derived validation and flatten the result
pub fn validate<T: Validate>(value: &T) -> Result<(), ValidationError> {
    match value.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let mut out = Vec::new();
            collect(String::new(), &errors, &mut out);
            out.sort();
            Err(ValidationError::FieldErrors(out))
        }
    }
}

fn collect(prefix: String, errors: &ValidationErrors, out: &mut Vec<FieldValidationError>) {
    for (field, kind) in errors.errors() {
        let name = camel_case(field);
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{}.{}", prefix, name)
        };

        match kind {
            ValidationErrorsKind::Field(failures) => {
                for failure in failures {
                    let message = failure
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| failure.code.to_string());
                    out.push(FieldValidationError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

/// `delivery_place_id` -> `deliveryPlaceId`
pub fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse an identifier field, reporting blank and malformed values separately
pub fn parse_id(field: &str, value: &str) -> Result<Uuid, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::FieldError {
            field: field.to_string(),
            message: "must not be blank".to_string(),
        });
    }
    Uuid::parse_str(value).map_err(|_| ValidationError::FieldError {
        field: field.to_string(),
        message: "must be a valid UUID".to_string(),
    })
}

/// Parse an optional identifier; blank means absent
pub fn parse_optional_id(field: &str, value: &str) -> Result<Option<Uuid>, ValidationError> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_id(field, value).map(Some)
    }
}

/// Take a value that derived validation already checked with `required`
pub fn required<T>(field: &str, value: Option<T>) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::FieldError {
        field: field.to_string(),
        message: "must not be null".to_string(),
    })
}

/// Parse an ISO-8601 calendar date; blank means absent
pub fn parse_date(field: &str, value: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::FieldError {
            field: field.to_string(),
            message: format!("could not parse date '{}', expected yyyy-MM-dd", value),
        })
}

//! Reusable field validators
//!
//! Plugged into `#[derive(Validate)]` through `custom(function = ...)`. Each
//! validator returns the message reported back to gRPC callers.

use chrono::{Local, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::sync::OnceLock;
use uuid::Uuid;
use validator::ValidationError;

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Validator: string must contain at least one non-whitespace character
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(failure("not_blank", "must not be blank"))
    } else {
        Ok(())
    }
}

/// Validator: non-blank string holding a UUID
pub fn uuid(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    Uuid::parse_str(value.trim())
        .map(|_| ())
        .map_err(|_| failure("uuid", "must be a valid UUID"))
}

/// Validator: UUID only when something was supplied
pub fn optional_uuid(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Ok(())
    } else {
        uuid(value)
    }
}

/// Validator: date is today or earlier (server local time)
pub fn past_or_present(value: &NaiveDate) -> Result<(), ValidationError> {
    if *value > Local::now().date_naive() {
        Err(failure(
            "past_or_present",
            "must be a date in the past or in the present",
        ))
    } else {
        Ok(())
    }
}

/// Validator: decimal strictly greater than zero
pub fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(failure("positive", "must be greater than 0"))
    }
}

/// Validator: Mercosur nomenclature code, eight digits
pub fn ncm(value: &str) -> Result<(), ValidationError> {
    static NCM_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = NCM_REGEX.get_or_init(|| Regex::new(r"^\d{8}$").unwrap());
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(failure("ncm", "must match \"\\d{8}\""))
    }
}

/// Validator: Brazilian company registry number (CNPJ)
///
/// Punctuation is ignored; the fourteen digits must carry valid check digits.
pub fn cnpj(value: &str) -> Result<(), ValidationError> {
    let digits: Vec<u32> = value
        .chars()
        .filter(|c| !matches!(c, '.' | '/' | '-' | ' '))
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| failure("cnpj", "invalid Brazilian corporate taxpayer registry number (CNPJ)"))?;

    if digits.len() != 14 || digits.iter().all(|d| *d == digits[0]) {
        return Err(failure(
            "cnpj",
            "invalid Brazilian corporate taxpayer registry number (CNPJ)",
        ));
    }

    let check = |len: usize| -> u32 {
        let weights = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
        let offset = weights.len() - len;
        let sum: u32 = digits[..len]
            .iter()
            .zip(&weights[offset..])
            .map(|(d, w)| d * w)
            .sum();
        match sum % 11 {
            0 | 1 => 0,
            r => 11 - r,
        }
    };

    if check(12) == digits[12] && check(13) == digits[13] {
        Ok(())
    } else {
        Err(failure(
            "cnpj",
            "invalid Brazilian corporate taxpayer registry number (CNPJ)",
        ))
    }
}

//! Field-format validation rules
//!
//! The formats come from the national conventions the system was built
//! around: NIC numbers are nine digits followed by V or X, mobile numbers
//! are E.164, country codes are ISO 3166-1 alpha-2.

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CustomerError;

static NIC_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{9}[VX]$").unwrap());
static MOBILE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap());
static COUNTRY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{2}$").unwrap());

/// Validates a NIC number (nine digits followed by V or X)
pub fn validate_nic(value: &str) -> Result<(), ValidationError> {
    if NIC_NUMBER.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("nic_number")
            .with_message("NIC number must be 9 digits followed by V or X".into()))
    }
}

/// Validates a mobile number (E.164, optional leading +)
pub fn validate_mobile(value: &str) -> Result<(), ValidationError> {
    if MOBILE_NUMBER.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("number").with_message("Invalid mobile number format".into()))
    }
}

/// Validates a two-letter uppercase country code
pub fn validate_country_code(value: &str) -> Result<(), ValidationError> {
    if COUNTRY_CODE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("code")
            .with_message("Country code must be 2 uppercase letters".into()))
    }
}

/// Validates that a date of birth lies strictly in the past
pub fn validate_past_date(value: &NaiveDate) -> Result<(), ValidationError> {
    if *value < Utc::now().date_naive() {
        Ok(())
    } else {
        Err(ValidationError::new("date_of_birth")
            .with_message("Date of birth must be in the past".into()))
    }
}

/// Runs derive-based validation and flattens the result into a domain error
///
/// The flattened message names each offending field so callers (and bulk
/// import logs) can point at the exact problem.
pub fn check<T: Validate>(value: &T) -> Result<(), CustomerError> {
    value
        .validate()
        .map_err(|errors| CustomerError::Validation(flatten_errors(&errors)))
}

fn flatten_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = Vec::new();
    collect_errors("", errors, &mut parts);
    parts.sort();
    parts.join("; ")
}

fn collect_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    out.push(format!("{}: {}", path, message));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_errors(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_errors(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}

//! Field validation.
//!
//! Every check returns the normalized value or `FastTrackError::Validation`, so callers
//! can reject input before anything touches the database.

use chrono::{NaiveDate, NaiveTime};

use crate::trip::{DATE_FORMAT, TIME_FORMAT};
use crate::{FastTrackError, Result};

fn invalid(msg: impl Into<String>) -> FastTrackError {
    FastTrackError::Validation(msg.into())
}

/// Check that `shape` and `value` agree position by position, where `d` stands
/// for an ASCII digit and every other byte must match literally.
fn has_shape(value: &str, shape: &str) -> bool {
    value.len() == shape.len()
        && value.bytes().zip(shape.bytes()).all(|(v, s)| match s {
            b'd' => v.is_ascii_digit(),
            _ => v == s,
        })
}

/// Trim and require a non-empty value.
///
/// # Errors
///
/// Returns a validation error when the value is blank.
pub fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Treat a missing or blank optional value as absent.
#[must_use]
pub fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns a validation error when the text is not exactly in that form or is not a
/// real calendar date.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    if !has_shape(value, "dddd-dd-dd") {
        return Err(invalid(format!("{field} must be in YYYY-MM-DD format")));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| invalid(format!("{field} is not a valid date")))
}

/// Parse a 24 hour `HH:MM:SS` time.
///
/// # Errors
///
/// Returns a validation error when the text is not exactly in that form or is out of
/// range.
pub fn parse_time(field: &str, value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    if !has_shape(value, "dd:dd:dd") {
        return Err(invalid(format!("{field} must be in HH:MM:SS (24hr) format")));
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| invalid(format!("{field} is not a valid time")))
}

/// Require a finite, positive amount.
///
/// # Errors
///
/// Returns a validation error otherwise.
pub fn fare(value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid("fare must be a positive number"))
    }
}

/// At least three characters of letters, spaces, apostrophes, dots or hyphens.
///
/// # Errors
///
/// Returns a validation error otherwise.
pub fn person_name(value: &str) -> Result<String> {
    let value = required("name", value)?;
    let allowed = |c: char| c.is_alphabetic() || c.is_whitespace() || matches!(c, '\'' | '.' | '-');
    if value.chars().count() < 3 || !value.chars().all(allowed) {
        return Err(invalid(
            "name must be at least 3 characters of letters and spaces",
        ));
    }
    Ok(value)
}

/// Something of the form `local@domain.tld`.
///
/// # Errors
///
/// Returns a validation error otherwise.
pub fn email(value: &str) -> Result<String> {
    let value = required("email", value)?;
    let valid = value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain
                .char_indices()
                .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
    });
    if !valid {
        return Err(invalid("email is not a valid address"));
    }
    Ok(value)
}

/// Exactly ten digits.
///
/// # Errors
///
/// Returns a validation error otherwise.
pub fn phone(field: &str, value: &str) -> Result<String> {
    let value = required(field, value)?;
    if !has_shape(&value, "dddddddddd") {
        return Err(invalid(format!("{field} must be exactly 10 digits")));
    }
    Ok(value)
}

/// At least three characters of letters, digits, spaces or hyphens.
///
/// # Errors
///
/// Returns a validation error otherwise.
pub fn license(value: &str) -> Result<String> {
    let value = required("license_number", value)?;
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == ' ';
    if value.len() < 3 || !value.chars().all(allowed) {
        return Err(invalid("license_number is not valid"));
    }
    Ok(value)
}

/// At least six characters including a letter and a digit.
///
/// # Errors
///
/// Returns a validation error otherwise.
pub fn password(value: &str) -> Result<String> {
    let value = required("password", value)?;
    let has_letter = value.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    if value.chars().count() < 6 || !has_letter || !has_digit {
        return Err(invalid(
            "password must be at least 6 characters and contain letters and numbers",
        ));
    }
    Ok(value)
}

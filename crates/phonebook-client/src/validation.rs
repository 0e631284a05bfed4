//! Form checks and phone input formatting
//!
//! Validation runs before any request; a rejected entry never reaches the
//! server.

use chrono::NaiveDate;
use phonebook_core::model::birth_date;

use crate::error::ValidationError;

/// Number of digits a phone number must have
pub const PHONE_DIGITS: usize = 10;

/// Digits shown before the separating space
const PHONE_GROUP: usize = 5;

/// Name must be non-empty after trimming
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    Ok(())
}

/// Phone number must contain exactly ten digits once everything else is
/// stripped
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.chars().filter(char::is_ascii_digit).count() != PHONE_DIGITS {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

/// Empty input means "no birth date"
pub fn parse_birth_date(raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    birth_date::parse(raw)
        .map(Some)
        .ok_or(ValidationError::InvalidBirthDate)
}

/// Reformat phone input as it is typed
///
/// Keeps digits only. Up to five digits pass through unchanged; longer
/// input becomes `DDDDD DDDDD`, cut at ten digits.
pub fn format_phone_input(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_DIGITS)
        .collect();

    if digits.len() <= PHONE_GROUP {
        return digits;
    }
    format!("{} {}", &digits[..PHONE_GROUP], &digits[PHONE_GROUP..])
}

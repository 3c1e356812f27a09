//! Input validation for customer records.
//!
//! Checks run in a fixed order: required fields first, then the phone format,
//! so the operator always sees the same message for the same mistake.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::CustomerInput;
use crate::error::ValidationError;

lazy_static! {
    /// Mainland mobile numbers: 11 digits, leading 1, second digit 3-9
    static ref PHONE_REGEX: Regex = Regex::new(r"^1[3-9]\d{9}$").unwrap();
}

/// Validate a phone number
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() {
        return Err(ValidationError::MissingRequired);
    }
    if !PHONE_REGEX.is_match(phone) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

/// Validate customer input. Expects already trimmed fields.
pub fn validate_customer(input: &CustomerInput) -> Result<(), ValidationError> {
    if input.company_name.is_empty() || input.contact_name.is_empty() || input.phone.is_empty()
    {
        return Err(ValidationError::MissingRequired);
    }

    validate_phone(&input.phone)
}

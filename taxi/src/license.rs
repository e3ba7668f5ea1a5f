//! Driver license number format.
//!
//! A license number is exactly three uppercase ASCII letters followed by
//! five ASCII digits, e.g. `ABC12345`. The check is case-sensitive and
//! anchored: surrounding whitespace is rejected here, so callers that want
//! to tolerate it (forms do) must trim first.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use taxi_core::ValidationError;
use taxi_db::validators::Validator;
use taxi_db::value::Value;

/// The message shown for a malformed license number.
pub const INVALID_LICENSE_MESSAGE: &str = "Driver license must consist only of 8 characters, \
     first 3 characters are uppercase letters, last 5 characters are digits.";

/// Error code carried by [`ValidationError::code`] for a malformed license.
pub const INVALID_LICENSE_FORMAT: &str = "invalid_license_format";

static LICENSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}[0-9]{5}$").expect("valid regex"));

static SHARED: LazyLock<Arc<dyn Validator>> =
    LazyLock::new(|| Arc::new(LicenseNumberValidator));

/// Checks `candidate` and returns it unchanged when well formed.
///
/// # Examples
///
/// ```
/// use taxi::license::{validate_license_number, INVALID_LICENSE_FORMAT};
///
/// assert_eq!(validate_license_number("ABC12345").unwrap(), "ABC12345");
/// let err = validate_license_number("abc12345").unwrap_err();
/// assert_eq!(err.code, INVALID_LICENSE_FORMAT);
/// ```
pub fn validate_license_number(candidate: &str) -> Result<&str, ValidationError> {
    if LICENSE_RE.is_match(candidate) {
        Ok(candidate)
    } else {
        Err(invalid_license())
    }
}

fn invalid_license() -> ValidationError {
    ValidationError::new(INVALID_LICENSE_MESSAGE, INVALID_LICENSE_FORMAT)
}

/// Field validator for license numbers.
///
/// Only strings can be license numbers; any other value fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LicenseNumberValidator;

impl Validator for LicenseNumberValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::String(s) => validate_license_number(s).map(|_| ()),
            _ => Err(invalid_license()),
        }
    }

    fn name(&self) -> &'static str {
        "license_number"
    }
}

/// The validator instance every license field shares.
pub fn license_validator() -> Arc<dyn Validator> {
    Arc::clone(&SHARED)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rejected(candidate: &str) {
        let err = validate_license_number(candidate).unwrap_err();
        assert_eq!(err.code, INVALID_LICENSE_FORMAT, "{candidate:?}");
        assert_eq!(err.message, INVALID_LICENSE_MESSAGE);
    }

    #[test]
    fn test_valid_license_returned_unchanged() {
        assert_eq!(validate_license_number("ABC12345").unwrap(), "ABC12345");
        assert_eq!(validate_license_number("ZZZ00000").unwrap(), "ZZZ00000");
    }

    #[test]
    fn test_message_text() {
        assert_eq!(
            INVALID_LICENSE_MESSAGE,
            "Driver license must consist only of 8 characters, first 3 characters are \
             uppercase letters, last 5 characters are digits."
        );
    }

    #[test]
    fn test_wrong_length_rejected() {
        for candidate in ["", "A", "ABC1234", "AB1234567", "ABC123456", "ABCD12345"] {
            assert_rejected(candidate);
        }
    }

    #[test]
    fn test_wrong_character_classes_rejected() {
        for candidate in ["abc12345", "ABCD1234", "AB123456", "12345ABC", "ABc12345", "ABC1234x"] {
            assert_rejected(candidate);
        }
    }

    #[test]
    fn test_surrounding_whitespace_rejected() {
        assert_rejected(" ABC12345");
        assert_rejected("ABC12345 ");
        assert_rejected("ABC12345\n");
    }

    #[test]
    fn test_non_ascii_rejected() {
        // Full-width digits and accented letters are not ASCII.
        assert_rejected("ABC１２３４５");
        assert_rejected("ÄBC12345");
        assert_rejected("ABC١٢٣٤٥");
    }

    #[test]
    fn test_every_letter_and_digit_accepted() {
        for (i, letter) in ('A'..='Z').enumerate() {
            let candidate = format!("{letter}{letter}{letter}{:05}", i * 3847 % 100_000);
            assert_eq!(validate_license_number(&candidate).unwrap(), candidate);
        }
    }

    #[test]
    fn test_field_validator() {
        let v = LicenseNumberValidator;
        assert!(v.validate(&Value::from("QWE98765")).is_ok());
        assert_eq!(
            v.validate(&Value::from("QWE9876")).unwrap_err().code,
            INVALID_LICENSE_FORMAT
        );
        assert!(v.validate(&Value::Int(12_345_678)).is_err());
        assert_eq!(v.name(), "license_number");
    }

    #[test]
    fn test_shared_instance() {
        assert!(Arc::ptr_eq(&license_validator(), &license_validator()));
    }

    #[test]
    fn test_concurrent_use() {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                std::thread::spawn(move || {
                    let candidate = format!("TAX{i:05}");
                    validate_license_number(&candidate).map(str::to_string)
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap().unwrap(), format!("TAX{i:05}"));
        }
    }
}

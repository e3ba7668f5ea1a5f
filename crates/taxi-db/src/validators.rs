//! Field validators.
//!
//! A [`Validator`] checks one constraint on an already-coerced [`Value`].
//! Validators are attached to model fields ([`FieldDef`](crate::fields::FieldDef))
//! and form fields alike, so a rule written once runs identically wherever
//! the field appears.

use std::fmt;

use regex::Regex;
use taxi_core::ValidationError;

use crate::value::Value;

/// A reusable check on a field value.
///
/// # Examples
///
/// ```
/// use taxi_db::validators::{MaxLengthValidator, Validator};
/// use taxi_db::value::Value;
///
/// let v = MaxLengthValidator::new(5);
/// assert!(v.validate(&Value::from("taxi")).is_ok());
/// assert!(v.validate(&Value::from("minivan")).is_err());
/// ```
pub trait Validator: Send + Sync + fmt::Debug {
    /// Validates `value`, returning the user-facing error on failure.
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;

    /// Returns a name for diagnostics.
    fn name(&self) -> &str;
}

/// Rejects strings longer than `max_length` characters.
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
    /// The maximum allowed length, in characters.
    pub max_length: usize,
}

impl MaxLengthValidator {
    /// Creates a new `MaxLengthValidator`.
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Validator for MaxLengthValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Value::String(s) = value else {
            return Ok(());
        };
        let len = s.chars().count();
        if len > self.max_length {
            return Err(ValidationError::new(
                format!(
                    "Ensure this value has at most {} characters (it has {len}).",
                    self.max_length
                ),
                "max_length",
            )
            .with_param("limit_value", self.max_length.to_string())
            .with_param("show_value", len.to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MaxLengthValidator"
    }
}

/// Requires string values to match a regular expression.
///
/// Non-string values pass untouched; type checks belong to the field.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    regex: Regex,
    message: String,
    code: String,
}

impl RegexValidator {
    /// Compiles `pattern` into a validator.
    pub fn new(
        pattern: &str,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self::from_regex(Regex::new(pattern)?, message, code))
    }

    /// Wraps an already compiled regex.
    pub fn from_regex(regex: Regex, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            regex,
            message: message.into(),
            code: code.into(),
        }
    }

    /// Returns the pattern source.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns `true` if `candidate` matches.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// Returns the error raised on mismatch.
    pub fn error(&self) -> ValidationError {
        ValidationError::new(self.message.clone(), self.code.clone())
    }
}

impl Validator for RegexValidator {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::String(s) if !self.is_match(s) => Err(self.error()),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "RegexValidator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_length_counts_chars() {
        let v = MaxLengthValidator::new(3);
        assert!(v.validate(&Value::from("äöü")).is_ok());
        let err = v.validate(&Value::from("abcd")).unwrap_err();
        assert_eq!(err.code, "max_length");
        assert_eq!(
            err.message,
            "Ensure this value has at most 3 characters (it has 4)."
        );
        assert_eq!(err.params["show_value"], "4");
    }

    #[test]
    fn test_max_length_ignores_non_strings() {
        let v = MaxLengthValidator::new(1);
        assert!(v.validate(&Value::Int(12345)).is_ok());
        assert!(v.validate(&Value::Null).is_ok());
    }

    #[test]
    fn test_regex_validator() {
        let v = RegexValidator::new(r"^[a-z]+$", "Lowercase only.", "invalid").unwrap();
        assert_eq!(v.pattern(), r"^[a-z]+$");
        assert!(v.validate(&Value::from("sedan")).is_ok());
        let err = v.validate(&Value::from("Sedan")).unwrap_err();
        assert_eq!(err.message, "Lowercase only.");
        assert_eq!(err.code, "invalid");
        assert_eq!(v.name(), "RegexValidator");
    }

    #[test]
    fn test_regex_validator_passes_non_strings() {
        let v = RegexValidator::new(r"^x$", "x", "x").unwrap();
        assert!(v.validate(&Value::Int(1)).is_ok());
        assert!(v.validate(&Value::Null).is_ok());
    }

    #[test]
    fn test_regex_validator_bad_pattern() {
        assert!(RegexValidator::new("(", "m", "c").is_err());
    }
}

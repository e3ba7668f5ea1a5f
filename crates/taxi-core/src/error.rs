//! Error types for taxi-rs.
//!
//! [`ValidationError`] is the recoverable, user-facing failure produced by
//! field validators and forms. [`TaxiError`] wraps it together with the
//! infrastructure failures (configuration, hashing, I/O) that callers
//! propagate with `?`.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A validation failure with a message, a machine-readable code, and
/// optional per-field errors.
///
/// # Examples
///
/// ```
/// use taxi_core::error::ValidationError;
///
/// let err = ValidationError::new("This field is required.", "required");
/// assert_eq!(err.code, "required");
/// assert_eq!(err.to_string(), "This field is required.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The human-readable message shown next to the field.
    pub message: String,
    /// Short code naming the failed rule (e.g. "required", "max_length").
    pub code: String,
    /// Values interpolated into the message, kept for callers that
    /// re-render it.
    pub params: HashMap<String, String>,
    /// Per-field errors, keyed by field name.
    pub field_errors: HashMap<String, Vec<Self>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
            field_errors: HashMap::new(),
        }
    }

    /// Creates a `ValidationError` that only carries per-field errors.
    pub fn with_field_errors(field_errors: HashMap<String, Vec<Self>>) -> Self {
        Self {
            message: String::new(),
            code: String::new(),
            params: HashMap::new(),
            field_errors,
        }
    }

    /// Adds a message parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if this error was raised by the rule named `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.code == code
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            return write!(f, "{}", self.message);
        }
        let mut fields: Vec<&String> = self.field_errors.keys().collect();
        fields.sort();
        let mut first = true;
        for field in fields {
            for error in &self.field_errors[field] {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {error}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for taxi-rs.
#[derive(Error, Debug)]
pub enum TaxiError {
    /// One or more values failed validation.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// A configuration value is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON or TOML (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Hashing or verifying a password failed.
    #[error("Password hashing error: {0}")]
    PasswordHashing(String),

    /// Any other internal failure (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for TaxiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<serde_json::Error> for TaxiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A convenience alias for `Result<T, TaxiError>`.
pub type TaxiResult<T> = Result<T, TaxiError>;

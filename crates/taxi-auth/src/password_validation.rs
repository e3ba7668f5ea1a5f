//! Password strength validation.
//!
//! A [`PasswordPolicy`] is an ordered list of [`PasswordValidator`]s. The
//! default policy checks minimum length, common passwords, all-digit
//! passwords and similarity to the user's own attributes.

use taxi_core::{Settings, ValidationError};

/// A single password rule.
pub trait PasswordValidator: Send + Sync + std::fmt::Debug {
    /// Validates `password`. `attributes` are `(verbose name, value)`
    /// pairs describing the user, e.g. `("username", "jdoe")`.
    fn validate(&self, password: &str, attributes: &[(&str, &str)]) -> Result<(), ValidationError>;

    /// Describes the rule to the user.
    fn help_text(&self) -> String;
}

/// Rejects passwords shorter than `min_length` characters.
#[derive(Debug, Clone)]
pub struct MinimumLengthValidator {
    /// The minimum length.
    pub min_length: usize,
}

impl Default for MinimumLengthValidator {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl PasswordValidator for MinimumLengthValidator {
    fn validate(
        &self,
        password: &str,
        _attributes: &[(&str, &str)],
    ) -> Result<(), ValidationError> {
        if password.chars().count() >= self.min_length {
            return Ok(());
        }
        Err(ValidationError::new(
            format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_length
            ),
            "password_too_short",
        )
        .with_param("min_length", self.min_length.to_string()))
    }

    fn help_text(&self) -> String {
        format!(
            "Your password must contain at least {} characters.",
            self.min_length
        )
    }
}

/// Rejects passwords found in a list of commonly used passwords.
#[derive(Debug, Clone)]
pub struct CommonPasswordValidator {
    /// Lowercase passwords to reject.
    pub common_passwords: Vec<String>,
}

const COMMON_PASSWORDS: &[&str] = &[
    "password", "123456", "12345678", "1234", "qwerty", "12345", "dragon", "baseball",
    "football", "letmein", "monkey", "696969", "abc123", "mustang", "michael", "shadow",
    "master", "jennifer", "111111", "2000", "jordan", "superman", "harley", "1234567",
    "hunter", "trustno1", "ranger", "buster", "thomas", "tigger", "robert", "soccer",
    "batman", "test", "pass", "killer", "hockey", "george", "charlie", "andrew",
    "michelle", "love", "sunshine", "jessica", "pepper", "daniel", "access", "123456789",
    "654321", "joshua", "maggie", "starwars", "silver", "william", "dallas", "yankees",
    "123123", "ashley", "666666", "hello", "amanda", "orange", "freedom", "computer",
    "thunder", "nicole", "ginger", "heather", "hammer", "summer", "corvette", "taylor",
    "austin", "1111", "merlin", "matthew", "121212", "golfer", "cheese", "princess",
    "martin", "chelsea", "patrick", "richard", "diamond", "yellow", "bigdog", "secret",
    "asdfgh", "sparky", "cowboy", "iloveyou", "admin", "password1", "qwerty123",
    "welcome", "1q2w3e4r", "taxi", "driver",
];

impl Default for CommonPasswordValidator {
    fn default() -> Self {
        Self {
            common_passwords: COMMON_PASSWORDS.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

impl PasswordValidator for CommonPasswordValidator {
    fn validate(
        &self,
        password: &str,
        _attributes: &[(&str, &str)],
    ) -> Result<(), ValidationError> {
        let lower = password.trim().to_lowercase();
        if self.common_passwords.iter().any(|p| *p == lower) {
            return Err(ValidationError::new(
                "This password is too common.",
                "password_too_common",
            ));
        }
        Ok(())
    }

    fn help_text(&self) -> String {
        "Your password can't be a commonly used password.".to_string()
    }
}

/// Rejects passwords made only of digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericPasswordValidator;

impl PasswordValidator for NumericPasswordValidator {
    fn validate(
        &self,
        password: &str,
        _attributes: &[(&str, &str)],
    ) -> Result<(), ValidationError> {
        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new(
                "This password is entirely numeric.",
                "password_entirely_numeric",
            ));
        }
        Ok(())
    }

    fn help_text(&self) -> String {
        "Your password can't be entirely numeric.".to_string()
    }
}

/// Rejects passwords too similar to one of the user's attributes.
///
/// Each attribute value is compared whole and split on non-alphanumeric
/// characters, so `jane.doe@example.com` is also checked as `jane`,
/// `doe` and so on.
#[derive(Debug, Clone, Copy)]
pub struct UserAttributeSimilarityValidator {
    /// Similarity ratio (0.0 to 1.0) at or above which a password fails.
    pub max_similarity: f64,
}

impl Default for UserAttributeSimilarityValidator {
    fn default() -> Self {
        Self {
            max_similarity: 0.7,
        }
    }
}

impl PasswordValidator for UserAttributeSimilarityValidator {
    fn validate(&self, password: &str, attributes: &[(&str, &str)]) -> Result<(), ValidationError> {
        let password = password.to_lowercase();
        for (verbose_name, value) in attributes {
            let value = value.to_lowercase();
            let parts = std::iter::once(value.as_str())
                .chain(value.split(|c: char| !c.is_alphanumeric()))
                .filter(|part| !part.is_empty());
            for part in parts {
                if similarity(&password, part) >= self.max_similarity {
                    return Err(ValidationError::new(
                        format!("The password is too similar to the {verbose_name}."),
                        "password_too_similar",
                    )
                    .with_param("verbose_name", *verbose_name));
                }
            }
        }
        Ok(())
    }

    fn help_text(&self) -> String {
        "Your password can't be too similar to your other personal information.".to_string()
    }
}

/// Ratio of matching characters, `2 * lcs / (len(a) + len(b))`.
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let mut prev = vec![0_usize; b.len() + 1];
    let mut curr = vec![0_usize; b.len() + 1];
    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    #[allow(clippy::cast_precision_loss)]
    let ratio = (2 * prev[b.len()]) as f64 / (a.len() + b.len()) as f64;
    ratio
}

/// An ordered set of password validators.
#[derive(Debug)]
pub struct PasswordPolicy {
    validators: Vec<Box<dyn PasswordValidator>>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::with_min_length(8)
    }
}

impl PasswordPolicy {
    /// A policy with no rules.
    pub fn empty() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// The default rules with a custom minimum length.
    pub fn with_min_length(min_length: usize) -> Self {
        Self::empty()
            .with_validator(UserAttributeSimilarityValidator::default())
            .with_validator(MinimumLengthValidator { min_length })
            .with_validator(CommonPasswordValidator::default())
            .with_validator(NumericPasswordValidator)
    }

    /// The default rules, with the minimum length from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_min_length(settings.password_min_length)
    }

    /// Appends a rule.
    #[must_use]
    pub fn with_validator(mut self, validator: impl PasswordValidator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Returns the help text of every rule.
    pub fn help_texts(&self) -> Vec<String> {
        self.validators.iter().map(|v| v.help_text()).collect()
    }

    /// Runs every rule and collects all failures.
    pub fn validate(
        &self,
        password: &str,
        attributes: &[(&str, &str)],
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = self
            .validators
            .iter()
            .filter_map(|v| v.validate(password, attributes).err())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Validates `password` against `policy`, returning every failure.
///
/// # Examples
///
/// ```
/// use taxi_auth::password_validation::{validate_password, PasswordPolicy};
///
/// let policy = PasswordPolicy::default();
/// assert!(validate_password("kestrel-junction-41", &policy, &[("username", "jdoe")]).is_ok());
/// let errors = validate_password("1234", &policy, &[]).unwrap_err();
/// assert_eq!(errors.len(), 3);
/// ```
pub fn validate_password(
    password: &str,
    policy: &PasswordPolicy,
    attributes: &[(&str, &str)],
) -> Result<(), Vec<ValidationError>> {
    policy.validate(password, attributes)
}

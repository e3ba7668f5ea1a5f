//! The user identity record.
//!
//! [`AbstractUser`] holds the fields every account has. Application
//! models embed it (a driver is a user plus a license number) and build
//! their [`ModelMeta`](taxi_db::model::ModelMeta) from [`user_field_defs`].

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use rand::distributions::{Alphanumeric, DistString};
use regex::Regex;
use serde::{Deserialize, Serialize};
use taxi_core::TaxiResult;
use taxi_db::fields::{FieldDef, FieldType};
use taxi_db::model::{Model, ModelMeta};
use taxi_db::validators::RegexValidator;
use taxi_db::value::Value;

use crate::hashers::{self, PasswordHasher, UNUSABLE_PASSWORD_PREFIX};

/// Pattern usernames must match: letters, digits and `@ . + - _`.
pub const USERNAME_PATTERN: &str = r"^[\w.@+-]+$";

/// Message shown for a username that does not match [`USERNAME_PATTERN`].
pub const USERNAME_MESSAGE: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

/// Maximum username length.
pub const USERNAME_MAX_LENGTH: usize = 150;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(USERNAME_PATTERN).expect("valid regex"));

static USER_META: LazyLock<ModelMeta> =
    LazyLock::new(|| ModelMeta::new("auth", "user", user_field_defs()));

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbstractUser {
    /// Primary key; `None` until stored.
    pub id: Option<i64>,
    /// Unique login name.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Encoded password hash. Unusable hashes start with `!`. Read from
    /// input but never written out.
    #[serde(skip_serializing)]
    pub password: String,
    /// Whether the user may use the admin site.
    pub is_staff: bool,
    /// Inactive accounts cannot log in.
    pub is_active: bool,
    /// Whether the user holds every permission.
    pub is_superuser: bool,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
}

impl Default for AbstractUser {
    fn default() -> Self {
        Self {
            id: None,
            username: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
            is_staff: false,
            is_active: true,
            is_superuser: false,
            date_joined: Utc::now(),
        }
    }
}

impl AbstractUser {
    /// Creates an unsaved, active user.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Hashes `raw_password` with Argon2id and stores the hash.
    pub async fn set_password(&mut self, raw_password: &str) -> TaxiResult<()> {
        self.password = hashers::make_password(raw_password).await?;
        Ok(())
    }

    /// Hashes `raw_password` with `hasher` and stores the hash.
    pub async fn set_password_with(
        &mut self,
        hasher: &dyn PasswordHasher,
        raw_password: &str,
    ) -> TaxiResult<()> {
        self.password = hashers::make_password_with(hasher, raw_password).await?;
        Ok(())
    }

    /// Returns `true` if `raw_password` matches the stored hash.
    pub async fn check_password(&self, raw_password: &str) -> TaxiResult<bool> {
        hashers::check_password(raw_password, &self.password).await
    }

    /// Replaces the password with a random unusable marker.
    pub fn set_unusable_password(&mut self) {
        let suffix = Alphanumeric.sample_string(&mut rand::thread_rng(), 40);
        self.password = format!("{UNUSABLE_PASSWORD_PREFIX}{suffix}");
    }

    /// Returns `false` if the account cannot log in with a password.
    pub fn has_usable_password(&self) -> bool {
        hashers::is_password_usable(&self.password)
    }

    /// Returns first and last name separated by a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Returns the attributes a password must not resemble, as
    /// `(verbose name, value)` pairs.
    pub fn similarity_attributes(&self) -> [(&'static str, &str); 4] {
        [
            ("username", self.username.as_str()),
            ("first name", self.first_name.as_str()),
            ("last name", self.last_name.as_str()),
            ("email address", self.email.as_str()),
        ]
    }
}

impl Model for AbstractUser {
    fn meta() -> &'static ModelMeta {
        &USER_META
    }

    fn pk(&self) -> Option<i64> {
        self.id
    }

    /// Matches the order of [`user_field_defs`].
    fn field_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("username", self.username.as_str().into()),
            ("first_name", self.first_name.as_str().into()),
            ("last_name", self.last_name.as_str().into()),
            ("email", self.email.as_str().into()),
            ("password", self.password.as_str().into()),
            ("is_staff", self.is_staff.into()),
            ("is_active", self.is_active.into()),
            ("is_superuser", self.is_superuser.into()),
            ("date_joined", self.date_joined.into()),
        ]
    }

    fn display(&self) -> String {
        self.username.clone()
    }
}

/// Field definitions shared by every user model.
///
/// `password` and `date_joined` are not editable: the password is set
/// through a hasher, never through a generated form field.
pub fn user_field_defs() -> Vec<FieldDef> {
    vec![
        FieldDef::new("id", FieldType::AutoField).primary_key(),
        FieldDef::new("username", FieldType::CharField)
            .max_length(USERNAME_MAX_LENGTH)
            .unique()
            .help_text("Required. 150 characters or fewer. Letters, digits and @/./+/-/_ only.")
            .validator(RegexValidator::from_regex(
                USERNAME_RE.clone(),
                USERNAME_MESSAGE,
                "invalid",
            )),
        FieldDef::new("first_name", FieldType::CharField)
            .max_length(150)
            .blank(),
        FieldDef::new("last_name", FieldType::CharField)
            .max_length(150)
            .blank(),
        FieldDef::new("email", FieldType::EmailField)
            .verbose_name("email address")
            .blank(),
        FieldDef::new("password", FieldType::CharField)
            .max_length(128)
            .not_editable(),
        FieldDef::new("is_staff", FieldType::BooleanField)
            .verbose_name("staff status")
            .default(false),
        FieldDef::new("is_active", FieldType::BooleanField)
            .verbose_name("active")
            .default(true),
        FieldDef::new("is_superuser", FieldType::BooleanField)
            .verbose_name("superuser status")
            .default(false),
        FieldDef::new("date_joined", FieldType::DateTimeField).not_editable(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashers::Pbkdf2Hasher;

    #[test]
    fn test_defaults() {
        let user = AbstractUser::new("jdoe");
        assert_eq!(user.username, "jdoe");
        assert!(user.is_active);
        assert!(!user.is_staff);
        assert!(user.id.is_none());
        assert!(!user.has_usable_password());
    }

    #[tokio::test]
    async fn test_set_and_check_password() {
        let mut user = AbstractUser::new("jdoe");
        user.set_password("kestrel-junction-41").await.unwrap();
        assert!(user.has_usable_password());
        assert!(user.check_password("kestrel-junction-41").await.unwrap());
        assert!(!user.check_password("kestrel").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_password_with_pbkdf2() {
        let mut user = AbstractUser::new("jdoe");
        user.set_password_with(&Pbkdf2Hasher { iterations: 1000 }, "secret-route")
            .await
            .unwrap();
        assert!(user.password.starts_with("pbkdf2_sha256$1000$"));
        assert!(user.check_password("secret-route").await.unwrap());
    }

    #[tokio::test]
    async fn test_unusable_password() {
        let mut user = AbstractUser::new("jdoe");
        user.set_unusable_password();
        assert!(user.password.starts_with('!'));
        assert_eq!(user.password.len(), 41);
        assert!(!user.has_usable_password());
        assert!(!user.check_password("").await.unwrap());
    }

    #[test]
    fn test_full_name() {
        let mut user = AbstractUser::new("jdoe");
        assert_eq!(user.full_name(), "");
        user.first_name = "Jane".into();
        assert_eq!(user.full_name(), "Jane");
        user.last_name = "Doe".into();
        assert_eq!(user.full_name(), "Jane Doe");
    }

    #[test]
    fn test_serde_defaults_missing_fields() {
        let user: AbstractUser =
            serde_json::from_value(serde_json::json!({"id": 3, "username": "amir"})).unwrap();
        assert_eq!(user.id, Some(3));
        assert!(user.is_active);
        assert!(user.password.is_empty());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let mut user = AbstractUser::new("jdoe");
        user.password = "pbkdf2_sha256$1000$salt$hash".into();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "jdoe");

        let with_hash: AbstractUser =
            serde_json::from_value(serde_json::json!({"username": "jdoe", "password": "!x"}))
                .unwrap();
        assert_eq!(with_hash.password, "!x");
    }

    #[test]
    fn test_field_values_match_defs() {
        let defs = user_field_defs();
        let user = AbstractUser::new("jdoe");
        let names: Vec<&str> = user.field_values().iter().map(|(n, _)| *n).collect();
        let def_names: Vec<&str> = defs.iter().map(|f| f.name).collect();
        assert_eq!(names, def_names);
    }

    #[test]
    fn test_model_impl() {
        let mut user = AbstractUser::new("jdoe");
        assert_eq!(AbstractUser::meta().label(), "auth.user");
        assert_eq!(user.pk(), None);
        user.id = Some(12);
        assert_eq!(user.field_value("id"), Some(Value::Int(12)));
        assert_eq!(user.display(), "jdoe");
    }

    #[test]
    fn test_username_validator() {
        let defs = user_field_defs();
        let username = defs.iter().find(|f| f.name == "username").unwrap();
        let validator = &username.validators[0];
        assert!(validator.validate(&Value::from("j.doe+taxi@fleet")).is_ok());
        assert!(validator.validate(&Value::from("Zoë_77")).is_ok());
        let err = validator.validate(&Value::from("j doe")).unwrap_err();
        assert_eq!(err.message, USERNAME_MESSAGE);
    }
}

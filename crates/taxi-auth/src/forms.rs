//! User registration form.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use taxi_core::{TaxiError, TaxiResult, ValidationError};
use taxi_db::model::Model;
use taxi_db::value::Value;
use taxi_forms::form::NON_FIELD_ERRORS;
use taxi_forms::model_form::{generate_form_fields, ModelFormConfig, ModelFormFields};
use taxi_forms::{BaseForm, Form, FormErrors, FormFieldDef, FormFieldType, WidgetType};
use taxi_http::QueryDict;

use crate::hashers::{Argon2Hasher, PasswordHasher};
use crate::password_validation::PasswordPolicy;
use crate::user::AbstractUser;

/// Error message when the two password fields differ.
pub const PASSWORD_MISMATCH: &str = "The two password fields didn\u{2019}t match.";

const PASSWORD2_HELP: &str = "Enter the same password as before, for verification.";

/// Registration form: a username plus a password entered twice.
///
/// The model fields come from a [`ModelFormConfig`], so a form for a
/// richer user model (for example one with a license number) is built by
/// including more fields. `password1` and `password2` always come last.
///
/// Validation checks that both passwords match and then runs the
/// [`PasswordPolicy`] against the password, using the submitted username
/// and names as similarity attributes. Password errors are reported under
/// `password2`.
#[derive(Debug)]
pub struct UserCreationForm {
    inner: BaseForm,
    policy: Arc<PasswordPolicy>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserCreationForm {
    /// A form over [`AbstractUser`] with only the `username` field.
    pub fn new() -> TaxiResult<Self> {
        Self::from_config(
            ModelFormConfig::new(AbstractUser::meta())
                .with_fields(ModelFormFields::include(["username"])),
        )
    }

    /// A form exposing the model fields `config` selects, followed by the
    /// two password fields.
    pub fn from_config(config: ModelFormConfig) -> TaxiResult<Self> {
        let policy = Arc::new(PasswordPolicy::default());
        let mut fields = generate_form_fields(&config)?;
        fields.extend(password_fields(&policy));
        Ok(Self {
            inner: BaseForm::new(fields).with_name("UserCreationForm"),
            policy,
            hasher: Arc::new(Argon2Hasher),
        })
    }

    /// Replaces the password policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<PasswordPolicy>) -> Self {
        let help = policy.help_texts().join(" ");
        if let Some(field) = self.inner.field_mut("password1") {
            field.help_text = help;
        }
        self.policy = policy;
        self
    }

    /// Replaces the hasher used by [`save`](Self::save).
    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Sets the name used in log spans.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.inner = self.inner.with_name(name);
        self
    }

    /// Adds a field before the password fields.
    #[must_use]
    pub fn with_extra_field(mut self, field: FormFieldDef) -> Self {
        let index = self
            .fields()
            .iter()
            .position(|f| f.name == "password1")
            .unwrap_or(self.fields().len());
        self.inner.insert_field(index, field);
        self
    }

    /// Returns the wrapped form.
    pub const fn inner(&self) -> &BaseForm {
        &self.inner
    }

    /// Returns the wrapped form for modification.
    pub fn inner_mut(&mut self) -> &mut BaseForm {
        &mut self.inner
    }

    /// Builds an unsaved user from the cleaned data, with the password
    /// hashed.
    pub async fn save(&self) -> TaxiResult<AbstractUser> {
        if !self.is_bound() || !self.errors().is_empty() || self.cleaned_data().is_empty() {
            return Err(TaxiError::Validation(ValidationError::new(
                "The user could not be created because the data didn't validate.",
                "invalid",
            )));
        }
        let data = self.cleaned_data();
        let text = |name: &str| {
            data.get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let mut user = AbstractUser::new(text("username"));
        user.first_name = text("first_name");
        user.last_name = text("last_name");
        user.email = text("email");
        user.set_password_with(self.hasher.as_ref(), &text("password1"))
            .await?;
        Ok(user)
    }

    fn similarity_attributes(&self) -> Vec<(&'static str, String)> {
        let data = self.cleaned_data();
        [
            ("username", "username"),
            ("first name", "first_name"),
            ("last name", "last_name"),
            ("email address", "email"),
        ]
        .into_iter()
        .filter_map(|(verbose, field)| {
            data.get(field)
                .and_then(Value::as_str)
                .map(|value| (verbose, value.to_string()))
        })
        .collect()
    }
}

fn password_fields(policy: &PasswordPolicy) -> [FormFieldDef; 2] {
    let unstripped = FormFieldType::Char {
        min_length: None,
        max_length: None,
        strip: false,
    };
    [
        FormFieldDef::new("password1", unstripped.clone())
            .label("Password")
            .widget(WidgetType::PasswordInput)
            .help_text(policy.help_texts().join(" ")),
        FormFieldDef::new("password2", unstripped)
            .label("Password confirmation")
            .widget(WidgetType::PasswordInput)
            .help_text(PASSWORD2_HELP),
    ]
}

#[async_trait]
impl Form for UserCreationForm {
    fn fields(&self) -> &[FormFieldDef] {
        self.inner.fields()
    }

    fn initial(&self) -> &HashMap<String, Value> {
        self.inner.initial()
    }

    fn prefix(&self) -> Option<&str> {
        self.inner.prefix()
    }

    fn bind(&mut self, data: &QueryDict) {
        self.inner.bind(data);
    }

    fn is_bound(&self) -> bool {
        self.inner.is_bound()
    }

    async fn is_valid(&mut self) -> bool {
        if !self.inner.is_bound() {
            return false;
        }
        self.inner.is_valid().await;
        if let Err(errors) = self.clean().await {
            for (field, errs) in errors {
                let field = (field != NON_FIELD_ERRORS).then_some(field);
                for e in errs {
                    self.inner.add_error(field.as_deref(), e);
                }
            }
        }
        let valid = self.inner.errors().is_empty();
        if !valid {
            tracing::debug!(form = self.inner.name(), "user creation rejected");
        }
        valid
    }

    fn errors(&self) -> &FormErrors {
        self.inner.errors()
    }

    fn cleaned_data(&self) -> &HashMap<String, Value> {
        self.inner.cleaned_data()
    }

    async fn clean(&self) -> Result<(), FormErrors> {
        let data = self.cleaned_data();
        let (Some(password1), Some(password2)) = (
            data.get("password1").and_then(Value::as_str),
            data.get("password2").and_then(Value::as_str),
        ) else {
            return Ok(());
        };

        let mut errors = FormErrors::new();
        if password1 != password2 {
            errors.insert(
                "password2".to_string(),
                vec![ValidationError::new(PASSWORD_MISMATCH, "password_mismatch")],
            );
            return Err(errors);
        }

        let owned = self.similarity_attributes();
        let attributes: Vec<(&str, &str)> =
            owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        if let Err(failures) = self.policy.validate(password2, &attributes) {
            errors.insert("password2".to_string(), failures);
            return Err(errors);
        }
        Ok(())
    }
}

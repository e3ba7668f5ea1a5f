//! Form field definitions and type-level cleaning.
//!
//! A [`FormFieldDef`] describes one form field: its [`FormFieldType`],
//! widget, labels, and attached validators. [`clean_field_value`] turns
//! the raw submitted strings for a field into a typed [`Value`].

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use taxi_core::ValidationError;
use taxi_db::validators::Validator;
use taxi_db::value::Value;

use crate::widgets::WidgetType;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

/// The type of a form field, with its type-specific parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormFieldType {
    /// A string field.
    Char {
        /// Minimum length, in characters.
        min_length: Option<usize>,
        /// Maximum length, in characters.
        max_length: Option<usize>,
        /// Whether surrounding whitespace is removed before validation.
        strip: bool,
    },
    /// An integer field.
    Integer {
        /// Minimum allowed value.
        min_value: Option<i64>,
        /// Maximum allowed value.
        max_value: Option<i64>,
    },
    /// A checkbox.
    Boolean,
    /// An email address.
    Email,
    /// A single reference to a model instance, picked by primary key.
    ModelChoice {
        /// Available `(pk, label)` pairs.
        choices: Vec<(String, String)>,
    },
    /// Any number of references to model instances.
    ModelMultipleChoice {
        /// Available `(pk, label)` pairs.
        choices: Vec<(String, String)>,
    },
}

impl FormFieldType {
    /// A stripped `Char` field without length limits.
    pub const fn char() -> Self {
        Self::Char {
            min_length: None,
            max_length: None,
            strip: true,
        }
    }

    /// Returns the widget used when none is configured.
    pub const fn default_widget(&self) -> WidgetType {
        match self {
            Self::Char { .. } => WidgetType::TextInput,
            Self::Integer { .. } => WidgetType::NumberInput,
            Self::Boolean => WidgetType::CheckboxInput,
            Self::Email => WidgetType::EmailInput,
            Self::ModelChoice { .. } => WidgetType::Select,
            Self::ModelMultipleChoice { .. } => WidgetType::SelectMultiple,
        }
    }

    /// Returns the available choices of a choice field.
    pub fn choices(&self) -> Option<&[(String, String)]> {
        match self {
            Self::ModelChoice { choices } | Self::ModelMultipleChoice { choices } => Some(choices),
            _ => None,
        }
    }
}

/// Complete definition of a form field.
///
/// This is the form-side counterpart of
/// [`FieldDef`](taxi_db::fields::FieldDef).
#[derive(Debug, Clone)]
pub struct FormFieldDef {
    /// The field name.
    pub name: String,
    /// The field type, controlling coercion.
    pub field_type: FormFieldType,
    /// Whether an empty submission is rejected.
    pub required: bool,
    /// Value shown before the form is bound.
    pub initial: Option<Value>,
    /// Human-readable label.
    pub label: String,
    /// Help text shown next to the field.
    pub help_text: String,
    /// The widget the field is presented with.
    pub widget: WidgetType,
    /// Validators run on the cleaned value.
    pub validators: Vec<Arc<dyn Validator>>,
    /// Message overrides keyed by error code.
    pub error_messages: HashMap<String, String>,
    /// Disabled fields ignore submitted data and keep their initial value.
    pub disabled: bool,
}

impl FormFieldDef {
    /// Creates a required field with the default widget for its type.
    pub fn new(name: impl Into<String>, field_type: FormFieldType) -> Self {
        let name = name.into();
        let label = name.replace('_', " ");
        Self {
            widget: field_type.default_widget(),
            name,
            field_type,
            required: true,
            initial: None,
            label,
            help_text: String::new(),
            validators: Vec::new(),
            error_messages: HashMap::new(),
            disabled: false,
        }
    }

    /// Sets whether the field is required.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn initial(mut self, value: impl Into<Value>) -> Self {
        self.initial = Some(value.into());
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Sets the widget.
    #[must_use]
    pub const fn widget(mut self, widget: WidgetType) -> Self {
        self.widget = widget;
        self
    }

    /// Attaches a validator.
    #[must_use]
    pub fn validator(self, validator: impl Validator + 'static) -> Self {
        self.shared_validator(Arc::new(validator))
    }

    /// Attaches a validator instance that is also used elsewhere.
    #[must_use]
    pub fn shared_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Overrides the message for an error code.
    #[must_use]
    pub fn error_message(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), message.into());
        self
    }

    /// Sets whether the field is disabled.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    fn error(&self, code: &str, default: impl Into<String>) -> ValidationError {
        let message = self
            .error_messages
            .get(code)
            .cloned()
            .unwrap_or_else(|| default.into());
        ValidationError::new(message, code)
    }
}

/// Cleans the raw submitted values of one field into a typed [`Value`].
///
/// `raw` holds every value submitted under the field's name; an empty
/// slice means nothing was submitted. Single-valued fields use the last
/// value.
///
/// The steps are: required check, coercion and type constraints, then
/// the attached validators. Validators only run when the type-level
/// checks passed and the value is not empty.
///
/// # Examples
///
/// ```
/// use taxi_forms::fields::{clean_field_value, FormFieldDef, FormFieldType};
/// use taxi_db::value::Value;
///
/// let field = FormFieldDef::new("model", FormFieldType::char());
/// assert_eq!(
///     clean_field_value(&field, &[" Prius ".to_string()]),
///     Ok(Value::from("Prius")),
/// );
/// assert!(clean_field_value(&field, &[]).is_err());
/// ```
pub fn clean_field_value(
    field: &FormFieldDef,
    raw: &[String],
) -> Result<Value, Vec<ValidationError>> {
    if let FormFieldType::ModelMultipleChoice { choices } = &field.field_type {
        return clean_multiple_choice(field, choices, raw);
    }

    let raw_str = raw.last().map_or("", String::as_str);
    let value = match &field.field_type {
        FormFieldType::Boolean => return clean_boolean(field, raw_str),
        FormFieldType::Char { strip: true, .. }
        | FormFieldType::Email
        | FormFieldType::Integer { .. }
        | FormFieldType::ModelChoice { .. } => raw_str.trim(),
        _ => raw_str,
    };

    if value.is_empty() {
        if field.required {
            return Err(vec![field.error("required", "This field is required.")]);
        }
        return Ok(empty_value(&field.field_type));
    }

    let mut errors = Vec::new();
    let cleaned = match &field.field_type {
        FormFieldType::Char {
            min_length,
            max_length,
            ..
        } => {
            let len = value.chars().count();
            if let Some(min) = min_length.filter(|min| len < *min) {
                errors.push(
                    field
                        .error(
                            "min_length",
                            format!("Ensure this value has at least {min} characters (it has {len})."),
                        )
                        .with_param("limit_value", min.to_string())
                        .with_param("show_value", len.to_string()),
                );
            }
            if let Some(max) = max_length.filter(|max| len > *max) {
                errors.push(
                    field
                        .error(
                            "max_length",
                            format!("Ensure this value has at most {max} characters (it has {len})."),
                        )
                        .with_param("limit_value", max.to_string())
                        .with_param("show_value", len.to_string()),
                );
            }
            Value::from(value)
        }
        FormFieldType::Integer {
            min_value,
            max_value,
        } => match value.parse::<i64>() {
            Ok(n) => {
                if let Some(min) = min_value.filter(|min| n < *min) {
                    errors.push(field.error(
                        "min_value",
                        format!("Ensure this value is greater than or equal to {min}."),
                    ));
                }
                if let Some(max) = max_value.filter(|max| n > *max) {
                    errors.push(field.error(
                        "max_value",
                        format!("Ensure this value is less than or equal to {max}."),
                    ));
                }
                Value::Int(n)
            }
            Err(_) => return Err(vec![field.error("invalid", "Enter a whole number.")]),
        },
        FormFieldType::Email => {
            if !EMAIL_RE.is_match(value) {
                errors.push(field.error("invalid", "Enter a valid email address."));
            }
            Value::from(value)
        }
        FormFieldType::ModelChoice { choices } => {
            if !choices.iter().any(|(pk, _)| pk == value) {
                return Err(vec![field
                    .error(
                        "invalid_choice",
                        "Select a valid choice. That choice is not one of the available choices.",
                    )
                    .with_param("value", value)]);
            }
            pk_value(value)
        }
        FormFieldType::Boolean | FormFieldType::ModelMultipleChoice { .. } => {
            unreachable!("handled above")
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    run_validators(field, cleaned)
}

fn clean_boolean(field: &FormFieldDef, raw: &str) -> Result<Value, Vec<ValidationError>> {
    let checked = !matches!(raw.to_ascii_lowercase().as_str(), "" | "false" | "0" | "off");
    if field.required && !checked {
        return Err(vec![field.error("required", "This field is required.")]);
    }
    Ok(Value::Bool(checked))
}

fn clean_multiple_choice(
    field: &FormFieldDef,
    choices: &[(String, String)],
    raw: &[String],
) -> Result<Value, Vec<ValidationError>> {
    let mut selected: Vec<&str> = Vec::with_capacity(raw.len());
    for value in raw.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if !selected.contains(&value) {
            selected.push(value);
        }
    }

    if selected.is_empty() {
        if field.required {
            return Err(vec![field.error("required", "This field is required.")]);
        }
        return Ok(Value::List(Vec::new()));
    }

    let errors: Vec<ValidationError> = selected
        .iter()
        .filter(|value| !choices.iter().any(|(pk, _)| pk == *value))
        .map(|value| {
            field
                .error(
                    "invalid_choice",
                    format!("Select a valid choice. {value} is not one of the available choices."),
                )
                .with_param("value", *value)
        })
        .collect();
    if !errors.is_empty() {
        return Err(errors);
    }

    run_validators(
        field,
        Value::List(selected.into_iter().map(pk_value).collect()),
    )
}

fn run_validators(field: &FormFieldDef, value: Value) -> Result<Value, Vec<ValidationError>> {
    let errors: Vec<ValidationError> = field
        .validators
        .iter()
        .filter_map(|v| v.validate(&value).err())
        .map(|e| match field.error_messages.get(&e.code) {
            Some(message) => ValidationError {
                message: message.clone(),
                ..e
            },
            None => e,
        })
        .collect();
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

fn pk_value(raw: &str) -> Value {
    raw.parse::<i64>().map_or_else(|_| Value::from(raw), Value::Int)
}

const fn empty_value(field_type: &FormFieldType) -> Value {
    match field_type {
        FormFieldType::Char { .. } | FormFieldType::Email => Value::String(String::new()),
        FormFieldType::ModelMultipleChoice { .. } => Value::List(Vec::new()),
        _ => Value::Null,
    }
}

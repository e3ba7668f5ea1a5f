//! The [`Form`] trait and [`BaseForm`].
//!
//! Validation is async so forms can consult external state (such as a
//! database) from their [`clean`](Form::clean) hook. Concrete forms
//! usually wrap a [`BaseForm`] and delegate to it, adding their own
//! cross-field checks through [`BaseForm::add_error`].

use std::collections::HashMap;

use async_trait::async_trait;
use taxi_core::logging::form_span;
use taxi_core::ValidationError;
use taxi_db::value::Value;
use taxi_http::QueryDict;
use tracing::Instrument;

use crate::fields::FormFieldDef;
use crate::validation;

/// Validation errors keyed by field name.
pub type FormErrors = HashMap<String, Vec<ValidationError>>;

/// Key under which errors that belong to no single field are stored.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// The core form trait.
#[async_trait]
pub trait Form: Send + Sync {
    /// Returns the field definitions, in display order.
    fn fields(&self) -> &[FormFieldDef];

    /// Returns the initial values shown by an unbound form.
    fn initial(&self) -> &HashMap<String, Value>;

    /// Returns the prefix namespacing this form's keys in submitted data.
    fn prefix(&self) -> Option<&str>;

    /// Binds submitted data, discarding any previous validation result.
    fn bind(&mut self, data: &QueryDict);

    /// Returns `true` once data has been bound.
    fn is_bound(&self) -> bool;

    /// Runs the validation pipeline. Unbound forms are never valid.
    ///
    /// Afterwards [`errors`](Form::errors) and
    /// [`cleaned_data`](Form::cleaned_data) hold the outcome.
    async fn is_valid(&mut self) -> bool;

    /// Returns the errors of the last validation run.
    fn errors(&self) -> &FormErrors;

    /// Returns the cleaned values of the fields that passed validation.
    fn cleaned_data(&self) -> &HashMap<String, Value>;

    /// Cross-field validation hook, run after every field was cleaned.
    async fn clean(&self) -> Result<(), FormErrors> {
        Ok(())
    }

    /// Serializes the errors as `{"field": [{"message": .., "code": ..}]}`
    /// with fields in sorted order.
    fn errors_as_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .errors()
            .iter()
            .map(|(field, errors)| {
                let list = errors
                    .iter()
                    .map(|e| serde_json::json!({ "message": e.message, "code": e.code }))
                    .collect();
                (field.clone(), serde_json::Value::Array(list))
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

/// A general-purpose form built from a list of field definitions.
///
/// # Examples
///
/// ```
/// use taxi_forms::{BaseForm, Form, FormFieldDef, FormFieldType};
/// use taxi_http::QueryDict;
///
/// let mut form = BaseForm::new(vec![FormFieldDef::new("model", FormFieldType::char())])
///     .with_prefix("car");
/// form.bind(&QueryDict::parse("car-model=Prius"));
/// assert!(form.is_bound());
/// assert_eq!(form.raw_value("model"), Some(&["Prius".to_string()][..]));
/// ```
#[derive(Debug)]
pub struct BaseForm {
    name: String,
    field_defs: Vec<FormFieldDef>,
    initial_data: HashMap<String, Value>,
    prefix: Option<String>,
    bound: bool,
    raw_data: HashMap<String, Vec<String>>,
    errors: FormErrors,
    cleaned_data: HashMap<String, Value>,
}

impl BaseForm {
    /// Creates an unbound form with the given fields.
    pub fn new(fields: Vec<FormFieldDef>) -> Self {
        Self {
            name: "form".to_string(),
            field_defs: fields,
            initial_data: HashMap::new(),
            prefix: None,
            bound: false,
            raw_data: HashMap::new(),
            errors: HashMap::new(),
            cleaned_data: HashMap::new(),
        }
    }

    /// Sets the name used in log spans.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the initial values.
    #[must_use]
    pub fn with_initial(mut self, initial: HashMap<String, Value>) -> Self {
        self.initial_data = initial;
        self
    }

    /// Sets the prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Returns the form's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the key a field is submitted under, honoring the prefix.
    pub fn html_name(&self, field_name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}-{field_name}"),
            None => field_name.to_string(),
        }
    }

    /// Looks up a field definition by name.
    pub fn field(&self, name: &str) -> Option<&FormFieldDef> {
        self.field_defs.iter().find(|f| f.name == name)
    }

    /// Looks up a field definition for modification.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormFieldDef> {
        self.field_defs.iter_mut().find(|f| f.name == name)
    }

    /// Appends a field.
    pub fn push_field(&mut self, field: FormFieldDef) {
        self.field_defs.push(field);
    }

    /// Inserts a field at `index`, shifting later fields back.
    pub fn insert_field(&mut self, index: usize, field: FormFieldDef) {
        self.field_defs.insert(index, field);
    }

    /// Returns the raw values bound for a field.
    pub fn raw_value(&self, name: &str) -> Option<&[String]> {
        self.raw_data.get(name).map(Vec::as_slice)
    }

    /// Records an error, for `field` or for the whole form when `None`.
    ///
    /// A field that receives an error is dropped from the cleaned data.
    pub fn add_error(&mut self, field: Option<&str>, error: ValidationError) {
        let key = field.unwrap_or(NON_FIELD_ERRORS);
        self.cleaned_data.remove(key);
        self.errors.entry(key.to_string()).or_default().push(error);
    }

    /// Returns the errors that belong to no single field.
    pub fn non_field_errors(&self) -> &[ValidationError] {
        self.errors
            .get(NON_FIELD_ERRORS)
            .map_or(&[], Vec::as_slice)
    }

    async fn run_validation(&mut self) -> bool {
        self.errors.clear();
        self.cleaned_data.clear();

        validation::clean_fields(
            &self.field_defs,
            &self.raw_data,
            &self.initial_data,
            &mut self.cleaned_data,
            &mut self.errors,
        );

        if let Err(form_errors) = self.clean().await {
            for (key, errors) in form_errors {
                for error in errors {
                    self.add_error(Some(&key), error);
                }
            }
        }

        if !self.errors.is_empty() {
            let mut invalid: Vec<&str> = self.errors.keys().map(String::as_str).collect();
            invalid.sort_unstable();
            tracing::debug!(fields = ?invalid, "form is invalid");
        }
        self.errors.is_empty()
    }
}

#[async_trait]
impl Form for BaseForm {
    fn fields(&self) -> &[FormFieldDef] {
        &self.field_defs
    }

    fn initial(&self) -> &HashMap<String, Value> {
        &self.initial_data
    }

    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn bind(&mut self, data: &QueryDict) {
        self.bound = true;
        self.errors.clear();
        self.cleaned_data.clear();

        let raw_data: HashMap<String, Vec<String>> = self
            .field_defs
            .iter()
            .map(|field| {
                let values = field
                    .widget
                    .value_from_data(data, &self.html_name(&field.name));
                (field.name.clone(), values)
            })
            .collect();
        self.raw_data = raw_data;
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    async fn is_valid(&mut self) -> bool {
        if !self.bound {
            return false;
        }
        let span = form_span(&self.name);
        self.run_validation().instrument(span).await
    }

    fn errors(&self) -> &FormErrors {
        &self.errors
    }

    fn cleaned_data(&self) -> &HashMap<String, Value> {
        &self.cleaned_data
    }
}

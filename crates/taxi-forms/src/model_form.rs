//! Forms generated from model metadata.
//!
//! [`ModelFormConfig`] names a model's [`ModelMeta`] and says which of its
//! fields a form exposes and how. [`generate_form_fields`] turns the
//! chosen [`FieldDef`]s into [`FormFieldDef`]s.

use std::collections::HashMap;

use taxi_core::{TaxiError, TaxiResult};
use taxi_db::fields::{FieldDef, FieldType};
use taxi_db::model::ModelMeta;

use crate::fields::{FormFieldDef, FormFieldType};
use crate::widgets::WidgetType;

/// Which model fields a model form exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelFormFields {
    /// Every editable field, in declaration order.
    All,
    /// Only the named fields, in the order given.
    Include(Vec<String>),
    /// Every editable field except the named ones.
    Exclude(Vec<String>),
}

impl ModelFormFields {
    /// Builds an include list from field names.
    pub fn include<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Include(names.into_iter().map(Into::into).collect())
    }
}

/// How to generate a form from a model.
#[derive(Debug)]
pub struct ModelFormConfig {
    /// The model the form edits.
    pub model_meta: &'static ModelMeta,
    /// Which fields to expose.
    pub fields: ModelFormFields,
    /// Widget overrides keyed by field name.
    pub widgets: HashMap<String, WidgetType>,
    /// Label overrides keyed by field name.
    pub labels: HashMap<String, String>,
    /// Help text overrides keyed by field name.
    pub help_texts: HashMap<String, String>,
    /// Required-flag overrides keyed by field name.
    pub required: HashMap<String, bool>,
    /// Available `(pk, label)` pairs for relational fields.
    pub choices: HashMap<String, Vec<(String, String)>>,
}

impl ModelFormConfig {
    /// Creates a configuration exposing all editable fields.
    pub fn new(model_meta: &'static ModelMeta) -> Self {
        Self {
            model_meta,
            fields: ModelFormFields::All,
            widgets: HashMap::new(),
            labels: HashMap::new(),
            help_texts: HashMap::new(),
            required: HashMap::new(),
            choices: HashMap::new(),
        }
    }

    /// Sets which fields to expose.
    #[must_use]
    pub fn with_fields(mut self, fields: ModelFormFields) -> Self {
        self.fields = fields;
        self
    }

    /// Overrides the widget of a field.
    #[must_use]
    pub fn with_widget(mut self, field_name: impl Into<String>, widget: WidgetType) -> Self {
        self.widgets.insert(field_name.into(), widget);
        self
    }

    /// Overrides the label of a field.
    #[must_use]
    pub fn with_label(mut self, field_name: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(field_name.into(), label.into());
        self
    }

    /// Overrides the help text of a field.
    #[must_use]
    pub fn with_help_text(
        mut self,
        field_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.help_texts.insert(field_name.into(), text.into());
        self
    }

    /// Overrides whether a field is required.
    #[must_use]
    pub fn with_required(mut self, field_name: impl Into<String>, required: bool) -> Self {
        self.required.insert(field_name.into(), required);
        self
    }

    /// Sets the choices offered by a relational field.
    #[must_use]
    pub fn with_choices(
        mut self,
        field_name: impl Into<String>,
        choices: Vec<(String, String)>,
    ) -> Self {
        self.choices.insert(field_name.into(), choices);
        self
    }
}

/// Generates the form fields described by `config`.
///
/// Primary keys and non-editable fields are never exposed. Foreign keys
/// become [`FormFieldType::ModelChoice`] and many-to-many fields become
/// [`FormFieldType::ModelMultipleChoice`], offering the choices configured
/// for them. The model field's validators are carried over.
///
/// Naming a field in an include or exclude list that the model does not
/// expose is a configuration error.
pub fn generate_form_fields(config: &ModelFormConfig) -> TaxiResult<Vec<FormFieldDef>> {
    let meta = config.model_meta;
    let exposed = |f: &&FieldDef| f.editable && !f.primary_key;

    let selected: Vec<&FieldDef> = match &config.fields {
        ModelFormFields::All => meta.fields.iter().filter(exposed).collect(),
        ModelFormFields::Include(names) => {
            check_known(meta, names)?;
            names
                .iter()
                .filter_map(|name| meta.field(name))
                .filter(exposed)
                .collect()
        }
        ModelFormFields::Exclude(names) => {
            check_known(meta, names)?;
            meta.fields
                .iter()
                .filter(exposed)
                .filter(|f| !names.iter().any(|n| n == f.name))
                .collect()
        }
    };

    Ok(selected
        .into_iter()
        .map(|model_field| form_field_for(config, model_field))
        .collect())
}

fn check_known(meta: &ModelMeta, names: &[String]) -> TaxiResult<()> {
    let unknown: Vec<&str> = names
        .iter()
        .filter(|name| meta.field(name).map_or(true, |f| !f.editable || f.primary_key))
        .map(String::as_str)
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    Err(TaxiError::Configuration(format!(
        "Unknown field(s) ({}) specified for {}",
        unknown.join(", "),
        meta.model_name
    )))
}

fn form_field_for(config: &ModelFormConfig, model_field: &FieldDef) -> FormFieldDef {
    let name = model_field.name;
    let choices = || config.choices.get(name).cloned().unwrap_or_default();
    let field_type = match &model_field.field_type {
        FieldType::IntegerField | FieldType::AutoField => FormFieldType::Integer {
            min_value: None,
            max_value: None,
        },
        FieldType::BooleanField => FormFieldType::Boolean,
        FieldType::EmailField => FormFieldType::Email,
        FieldType::ForeignKey { .. } => FormFieldType::ModelChoice { choices: choices() },
        FieldType::ManyToManyField { .. } => {
            FormFieldType::ModelMultipleChoice { choices: choices() }
        }
        FieldType::CharField | FieldType::TextField | FieldType::DateTimeField => {
            FormFieldType::Char {
                min_length: None,
                max_length: model_field.max_length,
                strip: true,
            }
        }
    };

    let mut form_field = FormFieldDef::new(name, field_type)
        .required(
            config
                .required
                .get(name)
                .copied()
                .unwrap_or_else(|| model_field.is_required()),
        )
        .label(
            config
                .labels
                .get(name)
                .cloned()
                .unwrap_or_else(|| model_field.verbose_name.clone()),
        )
        .help_text(
            config
                .help_texts
                .get(name)
                .cloned()
                .unwrap_or_else(|| model_field.help_text.clone()),
        );
    if let Some(widget) = config.widgets.get(name) {
        form_field = form_field.widget(*widget);
    }
    if let Some(default) = &model_field.default {
        form_field = form_field.initial(default.clone());
    }
    model_field
        .validators
        .iter()
        .fold(form_field, |field, validator| {
            field.shared_validator(validator.clone())
        })
}

//! Model field metadata.
//!
//! A [`FieldDef`] describes one model attribute: its [`FieldType`],
//! constraints, labels, and attached validators. Forms read these
//! definitions to generate their own fields.

use std::fmt;
use std::sync::Arc;

use crate::validators::Validator;
use crate::value::Value;

/// The type of a model field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum FieldType {
    /// Auto-incrementing integer primary key.
    AutoField,
    /// Bounded string.
    CharField,
    /// Unbounded text.
    TextField,
    /// Signed integer.
    IntegerField,
    /// Boolean flag.
    BooleanField,
    /// Email address.
    EmailField,
    /// Timestamp.
    DateTimeField,
    /// Many-to-one relation.
    ForeignKey {
        /// Target model label, e.g. "taxi.manufacturer".
        to: String,
    },
    /// Many-to-many relation.
    ManyToManyField {
        /// Target model label, e.g. "taxi.driver".
        to: String,
    },
}

/// Complete definition of a model field.
pub struct FieldDef {
    /// The attribute name.
    pub name: &'static str,
    /// The field type.
    pub field_type: FieldType,
    /// Whether this field is the primary key.
    pub primary_key: bool,
    /// Whether a missing value is stored as NULL.
    pub null: bool,
    /// Whether forms may leave the field empty.
    pub blank: bool,
    /// Whether values must be unique across rows.
    pub unique: bool,
    /// Maximum character length, for string fields.
    pub max_length: Option<usize>,
    /// Default value for new instances.
    pub default: Option<Value>,
    /// Human-readable name.
    pub verbose_name: String,
    /// Help text shown next to the form field.
    pub help_text: String,
    /// Whether forms include this field.
    pub editable: bool,
    /// Validators run on the field's value. Shared so generated form
    /// fields run the very same instances.
    pub validators: Vec<Arc<dyn Validator>>,
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("primary_key", &self.primary_key)
            .field("null", &self.null)
            .field("blank", &self.blank)
            .field("unique", &self.unique)
            .field("max_length", &self.max_length)
            .field(
                "validators",
                &self.validators.iter().map(|v| v.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl FieldDef {
    /// Creates a field with defaults: required, editable, not unique.
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            primary_key: false,
            null: false,
            blank: false,
            unique: false,
            max_length: None,
            default: None,
            verbose_name: name.replace('_', " "),
            help_text: String::new(),
            editable: true,
            validators: Vec::new(),
        }
    }

    /// Marks this field as the primary key. Primary keys are never editable.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.editable = false;
        self
    }

    /// Allows NULL.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    /// Allows the field to be left empty in forms.
    #[must_use]
    pub const fn blank(mut self) -> Self {
        self.blank = true;
        self
    }

    /// Adds a uniqueness constraint.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the verbose name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = name.into();
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Excludes this field from generated forms.
    #[must_use]
    pub const fn not_editable(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Attaches a validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Returns `true` for foreign-key and many-to-many fields.
    pub const fn is_relation(&self) -> bool {
        matches!(
            self.field_type,
            FieldType::ForeignKey { .. } | FieldType::ManyToManyField { .. }
        )
    }

    /// Returns `true` for many-to-many fields.
    pub const fn is_many_to_many(&self) -> bool {
        matches!(self.field_type, FieldType::ManyToManyField { .. })
    }

    /// Returns the target model label of a relational field.
    pub fn related_model(&self) -> Option<&str> {
        match &self.field_type {
            FieldType::ForeignKey { to } | FieldType::ManyToManyField { to } => Some(to),
            _ => None,
        }
    }

    /// Returns `true` if forms must receive a value for this field.
    pub const fn is_required(&self) -> bool {
        !self.null && !self.blank && self.default.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::MaxLengthValidator;

    #[test]
    fn test_defaults() {
        let f = FieldDef::new("license_number", FieldType::CharField);
        assert_eq!(f.verbose_name, "license number");
        assert!(f.editable);
        assert!(f.is_required());
        assert!(f.validators.is_empty());
    }

    #[test]
    fn test_primary_key_not_editable() {
        let f = FieldDef::new("id", FieldType::AutoField).primary_key();
        assert!(f.primary_key);
        assert!(!f.editable);
    }

    #[test]
    fn test_validator_attached() {
        let f = FieldDef::new("model", FieldType::CharField)
            .max_length(255)
            .validator(MaxLengthValidator::new(255));
        assert_eq!(f.max_length, Some(255));
        assert_eq!(f.validators.len(), 1);
        assert_eq!(f.validators[0].name(), "MaxLengthValidator");
    }

    #[test]
    fn test_relations() {
        let fk = FieldDef::new(
            "manufacturer",
            FieldType::ForeignKey {
                to: "taxi.manufacturer".into(),
            },
        );
        assert!(fk.is_relation());
        assert!(!fk.is_many_to_many());
        assert_eq!(fk.related_model(), Some("taxi.manufacturer"));

        let m2m = FieldDef::new(
            "drivers",
            FieldType::ManyToManyField {
                to: "taxi.driver".into(),
            },
        );
        assert!(m2m.is_many_to_many());
        assert!(FieldDef::new("x", FieldType::TextField)
            .related_model()
            .is_none());
    }

    #[test]
    fn test_required_rules() {
        assert!(!FieldDef::new("a", FieldType::CharField).blank().is_required());
        assert!(!FieldDef::new("a", FieldType::CharField)
            .nullable()
            .is_required());
        assert!(!FieldDef::new("a", FieldType::BooleanField)
            .default(false)
            .is_required());
    }

    #[test]
    fn test_debug_lists_validator_names() {
        let f = FieldDef::new("name", FieldType::CharField).validator(MaxLengthValidator::new(10));
        assert!(format!("{f:?}").contains("MaxLengthValidator"));
    }
}

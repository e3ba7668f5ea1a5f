//! The [`Model`] trait and [`ModelMeta`].
//!
//! `ModelMeta` plays the role of a model's `Meta` options: its label,
//! human-readable names, and ordered field definitions. Model forms are
//! generated from it.

use crate::fields::FieldDef;
use crate::value::Value;

/// Static metadata about a model.
#[derive(Debug)]
pub struct ModelMeta {
    /// The application label (e.g. "taxi").
    pub app_label: &'static str,
    /// The lowercase model name (e.g. "driver").
    pub model_name: &'static str,
    /// Human-readable singular name.
    pub verbose_name: String,
    /// Human-readable plural name.
    pub verbose_name_plural: String,
    /// Field definitions, in declaration order.
    pub fields: Vec<FieldDef>,
}

impl ModelMeta {
    /// Creates metadata with verbose names derived from the model name.
    pub fn new(app_label: &'static str, model_name: &'static str, fields: Vec<FieldDef>) -> Self {
        Self {
            app_label,
            model_name,
            verbose_name: model_name.to_string(),
            verbose_name_plural: format!("{model_name}s"),
            fields,
        }
    }

    /// Overrides the plural verbose name.
    #[must_use]
    pub fn verbose_name_plural(mut self, name: impl Into<String>) -> Self {
        self.verbose_name_plural = name.into();
        self
    }

    /// Returns the `app_label.model_name` label used by relations.
    pub fn label(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the names of all fields, in declaration order.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }
}

/// A model whose instances can seed and be produced by forms.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
/// use taxi_db::fields::{FieldDef, FieldType};
/// use taxi_db::model::{Model, ModelMeta};
/// use taxi_db::value::Value;
///
/// struct Depot { id: Option<i64>, name: String }
///
/// impl Model for Depot {
///     fn meta() -> &'static ModelMeta {
///         static META: LazyLock<ModelMeta> = LazyLock::new(|| {
///             ModelMeta::new("taxi", "depot", vec![
///                 FieldDef::new("id", FieldType::AutoField).primary_key(),
///                 FieldDef::new("name", FieldType::CharField).max_length(100),
///             ])
///         });
///         &META
///     }
///     fn pk(&self) -> Option<i64> { self.id }
///     fn field_values(&self) -> Vec<(&'static str, Value)> {
///         vec![("id", self.id.into()), ("name", self.name.as_str().into())]
///     }
///     fn display(&self) -> String { self.name.clone() }
/// }
///
/// let depot = Depot { id: Some(1), name: "North".into() };
/// assert_eq!(Depot::meta().label(), "taxi.depot");
/// assert_eq!(depot.field_value("name"), Some(Value::from("North")));
/// ```
pub trait Model: Send + Sync + 'static {
    /// Returns the static metadata for this model type.
    fn meta() -> &'static ModelMeta
    where
        Self: Sized;

    /// Returns the primary key, or `None` for unsaved instances.
    fn pk(&self) -> Option<i64>;

    /// Returns every field as a name/value pair.
    fn field_values(&self) -> Vec<(&'static str, Value)>;

    /// Returns the label shown for this instance in choice lists.
    fn display(&self) -> String;

    /// Returns the value of a single field.
    fn field_value(&self, name: &str) -> Option<Value> {
        self.field_values()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }
}

/// Builds `(value, label)` choice pairs from saved model instances.
///
/// Unsaved instances (no primary key) cannot be referenced and are
/// skipped.
pub fn choices_from<M: Model>(instances: &[M]) -> Vec<(String, String)> {
    instances
        .iter()
        .filter_map(|m| m.pk().map(|pk| (pk.to_string(), m.display())))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::fields::FieldType;

    struct Depot {
        id: Option<i64>,
        name: String,
    }

    impl Model for Depot {
        fn meta() -> &'static ModelMeta {
            static META: LazyLock<ModelMeta> = LazyLock::new(|| {
                ModelMeta::new(
                    "taxi",
                    "depot",
                    vec![
                        FieldDef::new("id", FieldType::AutoField).primary_key(),
                        FieldDef::new("name", FieldType::CharField).max_length(100),
                    ],
                )
            });
            &META
        }

        fn pk(&self) -> Option<i64> {
            self.id
        }

        fn field_values(&self) -> Vec<(&'static str, Value)> {
            vec![("id", self.id.into()), ("name", self.name.as_str().into())]
        }

        fn display(&self) -> String {
            self.name.clone()
        }
    }

    #[test]
    fn test_meta_lookup() {
        let meta = Depot::meta();
        assert_eq!(meta.label(), "taxi.depot");
        assert_eq!(meta.verbose_name_plural, "depots");
        assert_eq!(meta.field_names(), vec!["id", "name"]);
        assert!(meta.field("name").is_some());
        assert!(meta.field("missing").is_none());
    }

    #[test]
    fn test_verbose_name_plural_override() {
        let meta = ModelMeta::new("taxi", "bus", vec![]).verbose_name_plural("buses");
        assert_eq!(meta.verbose_name_plural, "buses");
    }

    #[test]
    fn test_field_value() {
        let d = Depot {
            id: None,
            name: "South".into(),
        };
        assert_eq!(d.field_value("id"), Some(Value::Null));
        assert_eq!(d.field_value("name"), Some(Value::from("South")));
        assert_eq!(d.field_value("nope"), None);
    }

    #[test]
    fn test_choices_skip_unsaved() {
        let depots = vec![
            Depot {
                id: Some(2),
                name: "East".into(),
            },
            Depot {
                id: None,
                name: "Draft".into(),
            },
        ];
        assert_eq!(
            choices_from(&depots),
            vec![("2".to_string(), "East".to_string())]
        );
    }
}

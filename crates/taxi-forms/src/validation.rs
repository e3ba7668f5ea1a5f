//! The form validation pipeline.
//!
//! Field-level cleaning runs first, then the form's async
//! [`clean`](crate::form::Form::clean) hook. Errors accumulate across all
//! fields so a submission reports every problem at once.

use std::collections::HashMap;

use taxi_core::ValidationError;
use taxi_db::value::Value;

use crate::fields::{clean_field_value, FormFieldDef};
use crate::form::{Form, FormErrors};

/// Cleans every field, filling `cleaned_data` or `errors`.
///
/// Disabled fields ignore submitted data: they take their value from
/// `initial` (the form's initial data, then the field's own initial) and
/// skip validation.
pub fn clean_fields(
    field_defs: &[FormFieldDef],
    raw_data: &HashMap<String, Vec<String>>,
    initial: &HashMap<String, Value>,
    cleaned_data: &mut HashMap<String, Value>,
    errors: &mut FormErrors,
) {
    for field in field_defs {
        if field.disabled {
            if let Some(value) = initial.get(&field.name).or(field.initial.as_ref()) {
                cleaned_data.insert(field.name.clone(), value.clone());
            }
            continue;
        }

        let raw = raw_data.get(&field.name).map_or(&[][..], Vec::as_slice);
        match clean_field_value(field, raw) {
            Ok(value) => {
                cleaned_data.insert(field.name.clone(), value);
            }
            Err(field_errors) => {
                errors.insert(field.name.clone(), field_errors);
            }
        }
    }
}

/// Validates `form` and returns its errors as `(field, errors)` pairs
/// sorted by field name.
pub async fn full_clean(form: &mut dyn Form) -> Result<(), Vec<(String, Vec<ValidationError>)>> {
    if form.is_valid().await {
        return Ok(());
    }
    let mut errors: Vec<(String, Vec<ValidationError>)> = form
        .errors()
        .iter()
        .map(|(field, errs)| (field.clone(), errs.clone()))
        .collect();
    errors.sort_by(|a, b| a.0.cmp(&b.0));
    Err(errors)
}

#[cfg(test)]
mod tests {
    use taxi_http::QueryDict;

    use super::*;
    use crate::fields::FormFieldType;
    use crate::form::BaseForm;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), vec![(*v).to_string()]))
            .collect()
    }

    #[test]
    fn test_clean_fields_valid() {
        let fields = vec![
            FormFieldDef::new("name", FormFieldType::char()),
            FormFieldDef::new(
                "seats",
                FormFieldType::Integer {
                    min_value: Some(1),
                    max_value: None,
                },
            ),
        ];
        let mut cleaned = HashMap::new();
        let mut errors = HashMap::new();
        clean_fields(
            &fields,
            &raw(&[("name", "Toyota"), ("seats", "4")]),
            &HashMap::new(),
            &mut cleaned,
            &mut errors,
        );
        assert!(errors.is_empty());
        assert_eq!(cleaned["name"], Value::from("Toyota"));
        assert_eq!(cleaned["seats"], Value::Int(4));
    }

    #[test]
    fn test_clean_fields_accumulates() {
        let fields = vec![
            FormFieldDef::new("name", FormFieldType::char()),
            FormFieldDef::new("email", FormFieldType::Email),
        ];
        let mut cleaned = HashMap::new();
        let mut errors = HashMap::new();
        clean_fields(
            &fields,
            &raw(&[("email", "x")]),
            &HashMap::new(),
            &mut cleaned,
            &mut errors,
        );
        assert_eq!(errors.len(), 2);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn test_disabled_field_uses_initial() {
        let fields = vec![
            FormFieldDef::new("license_number", FormFieldType::char()).disabled(true),
            FormFieldDef::new("country", FormFieldType::char())
                .disabled(true)
                .initial("Japan"),
        ];
        let mut initial = HashMap::new();
        initial.insert("license_number".to_string(), Value::from("ABC12345"));
        let mut cleaned = HashMap::new();
        let mut errors = HashMap::new();
        clean_fields(
            &fields,
            &raw(&[("license_number", "tampered"), ("country", "x")]),
            &initial,
            &mut cleaned,
            &mut errors,
        );
        assert!(errors.is_empty());
        assert_eq!(cleaned["license_number"], Value::from("ABC12345"));
        assert_eq!(cleaned["country"], Value::from("Japan"));
    }

    #[tokio::test]
    async fn test_full_clean_sorted() {
        let mut form = BaseForm::new(vec![
            FormFieldDef::new("model", FormFieldType::char()),
            FormFieldDef::new("country", FormFieldType::char()),
            FormFieldDef::new("name", FormFieldType::char()),
        ]);
        form.bind(&QueryDict::new());
        let errors = full_clean(&mut form).await.unwrap_err();
        let names: Vec<&str> = errors.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(names, vec!["country", "model", "name"]);
    }

    #[tokio::test]
    async fn test_full_clean_ok() {
        let mut form = BaseForm::new(vec![FormFieldDef::new("model", FormFieldType::char())]);
        form.bind(&QueryDict::parse("model=Leaf"));
        assert!(full_clean(&mut form).await.is_ok());
    }
}

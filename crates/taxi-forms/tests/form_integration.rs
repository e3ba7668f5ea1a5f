//! Integration tests for model-generated forms bound to submitted data.

use std::sync::LazyLock;

use taxi_db::fields::{FieldDef, FieldType};
use taxi_db::model::ModelMeta;
use taxi_db::validators::RegexValidator;
use taxi_db::value::Value;
use taxi_forms::model_form::{generate_form_fields, ModelFormConfig, ModelFormFields};
use taxi_forms::validation::full_clean;
use taxi_forms::{BaseForm, Form, WidgetType};
use taxi_http::QueryDict;

// ============================================================================
// Shared helpers
// ============================================================================

static ROUTE: LazyLock<ModelMeta> = LazyLock::new(|| {
    ModelMeta::new(
        "fleet",
        "route",
        vec![
            FieldDef::new("id", FieldType::AutoField).primary_key(),
            FieldDef::new("code", FieldType::CharField)
                .max_length(6)
                .validator(
                    RegexValidator::new(r"^R[0-9]+$", "Route codes look like R12.", "invalid_code")
                        .unwrap(),
                ),
            FieldDef::new(
                "depot",
                FieldType::ForeignKey {
                    to: "fleet.depot".into(),
                },
            ),
            FieldDef::new(
                "vehicles",
                FieldType::ManyToManyField {
                    to: "fleet.vehicle".into(),
                },
            ),
        ],
    )
});

fn route_form() -> BaseForm {
    let config = ModelFormConfig::new(&ROUTE)
        .with_choices(
            "depot",
            vec![("1".into(), "North".into()), ("2".into(), "South".into())],
        )
        .with_choices(
            "vehicles",
            vec![("10".into(), "Leaf".into()), ("11".into(), "Prius".into())],
        )
        .with_widget("vehicles", WidgetType::CheckboxSelectMultiple)
        .with_required("vehicles", false);
    BaseForm::new(generate_form_fields(&config).unwrap()).with_name("RouteForm")
}

// ============================================================================
// Model form binding
// ============================================================================

#[tokio::test]
async fn test_valid_submission() {
    let mut form = route_form();
    form.bind(&QueryDict::parse("code=R12&depot=2&vehicles=10&vehicles=11"));
    assert!(form.is_valid().await);
    let data = form.cleaned_data();
    assert_eq!(data["code"], Value::from("R12"));
    assert_eq!(data["depot"], Value::Int(2));
    assert_eq!(
        data["vehicles"],
        Value::List(vec![Value::Int(10), Value::Int(11)])
    );
}

#[tokio::test]
async fn test_optional_many_to_many_may_be_empty() {
    let mut form = route_form();
    form.bind(&QueryDict::parse("code=R1&depot=1"));
    assert!(form.is_valid().await);
    assert_eq!(form.cleaned_data()["vehicles"], Value::List(vec![]));
}

#[tokio::test]
async fn test_foreign_key_required() {
    let mut form = route_form();
    form.bind(&QueryDict::parse("code=R1"));
    assert!(!form.is_valid().await);
    assert_eq!(form.errors()["depot"][0].code, "required");
}

#[tokio::test]
async fn test_unknown_choices_rejected() {
    let mut form = route_form();
    form.bind(&QueryDict::parse("code=R1&depot=9&vehicles=10&vehicles=99"));
    let errors = full_clean(&mut form).await.unwrap_err();
    let fields: Vec<&str> = errors.iter().map(|(f, _)| f.as_str()).collect();
    assert_eq!(fields, vec!["depot", "vehicles"]);
    assert_eq!(
        errors[1].1[0].message,
        "Select a valid choice. 99 is not one of the available choices."
    );
}

#[tokio::test]
async fn test_model_validator_runs_in_form() {
    let mut form = route_form();
    form.bind(&QueryDict::parse("code=X12&depot=1"));
    assert!(!form.is_valid().await);
    let errors = &form.errors()["code"];
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "invalid_code");
    assert_eq!(errors[0].message, "Route codes look like R12.");
}

#[tokio::test]
async fn test_max_length_checked_before_validators() {
    let mut form = route_form();
    form.bind(&QueryDict::parse("code=R123456&depot=1"));
    assert!(!form.is_valid().await);
    let errors = &form.errors()["code"];
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "max_length");
}

#[tokio::test]
async fn test_include_only_subset() {
    let config = ModelFormConfig::new(&ROUTE).with_fields(ModelFormFields::include(["code"]));
    let mut form = BaseForm::new(generate_form_fields(&config).unwrap());
    form.bind(&QueryDict::parse("code=R7&depot=nonsense"));
    assert!(form.is_valid().await);
    assert_eq!(form.cleaned_data().len(), 1);
}

#[tokio::test]
async fn test_errors_as_json_shape() {
    let mut form = route_form();
    form.bind(&QueryDict::new());
    assert!(!form.is_valid().await);
    let json = form.errors_as_json();
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["code", "depot"]);
    assert_eq!(json["code"][0]["message"], "This field is required.");
}

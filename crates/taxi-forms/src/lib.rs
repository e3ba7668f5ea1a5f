//! # taxi-forms
//!
//! Form handling for taxi-rs: field definitions with type coercion,
//! widgets that know how to read submitted data, the async [`Form`]
//! trait, and forms generated from model metadata.

pub mod fields;
pub mod form;
pub mod model_form;
pub mod validation;
pub mod widgets;

pub use fields::{FormFieldDef, FormFieldType};
pub use form::{BaseForm, Form, FormErrors};
pub use model_form::{generate_form_fields, ModelFormConfig, ModelFormFields};
pub use widgets::WidgetType;

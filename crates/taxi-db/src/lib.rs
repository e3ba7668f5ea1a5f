//! # taxi-db
//!
//! Model-side building blocks: the [`Value`](value::Value) type carried
//! between models and forms, field metadata ([`fields`]), the
//! [`Model`](model::Model) trait, and field [`validators`].
//!
//! Persistence is not part of this crate. Models describe their fields so
//! forms can be generated from them; storing instances is left to the
//! caller.

pub mod fields;
pub mod model;
pub mod validators;
pub mod value;

pub use fields::{FieldDef, FieldType};
pub use model::{Model, ModelMeta};
pub use validators::Validator;
pub use value::Value;

//! # taxi-core
//!
//! Foundation types shared by every taxi-rs crate.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Application settings with defaults
//! - [`settings_loader`] - Loading settings from TOML, JSON and the environment
//! - [`logging`] - Tracing-based logging setup

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

pub use error::{TaxiError, TaxiResult, ValidationError};
pub use settings::Settings;

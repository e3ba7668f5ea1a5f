//! Loading [`Settings`] from configuration files and the environment.
//!
//! ## Loading Order
//!
//! 1. Start with [`Settings::default`].
//! 2. Deep-merge a TOML or JSON file over the defaults.
//! 3. Apply `TAXI_*` environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `TAXI_DEBUG` | `debug` |
//! | `TAXI_SECRET_KEY` | `secret_key` |
//! | `TAXI_LOG_LEVEL` | `log_level` |
//! | `TAXI_LOG_FORMAT` | `log_format` |
//! | `TAXI_LANGUAGE_CODE` | `language_code` |
//! | `TAXI_TIME_ZONE` | `time_zone` |
//! | `TAXI_PASSWORD_MIN_LENGTH` | `password_min_length` |
//!
//! ```rust,no_run
//! use taxi_core::settings_loader;
//!
//! let settings = settings_loader::from_file_with_env("taxi.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::TaxiError;
use crate::settings::Settings;

/// Loads settings from a TOML string, keeping defaults for missing keys.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, TaxiError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| TaxiError::Configuration(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, TaxiError> {
    from_toml_str(&read_config(path.as_ref())?)
}

/// Loads settings from a JSON string, keeping defaults for missing keys.
pub fn from_json_str(json_str: &str) -> Result<Settings, TaxiError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| TaxiError::Configuration(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, TaxiError> {
    from_json_str(&read_config(path.as_ref())?)
}

/// Loads settings from a file, picking the format from its extension
/// (`.json` is JSON, anything else is TOML), then applies environment
/// overrides.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, TaxiError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let mut settings = if is_json {
        from_json_file(path)?
    } else {
        from_toml_file(path)?
    };
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Builds settings from defaults plus environment overrides only.
pub fn from_env() -> Result<Settings, TaxiError> {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Applies `TAXI_*` environment variables to `settings`.
pub fn apply_env_overrides(settings: &mut Settings) -> Result<(), TaxiError> {
    apply_overrides_from(settings, |key| std::env::var(key).ok())
}

/// Applies overrides read through `lookup`, which maps a `TAXI_*` variable
/// name to its value.
///
/// Malformed numeric or enum values are configuration errors rather than
/// being silently ignored.
pub fn apply_overrides_from<F>(settings: &mut Settings, lookup: F) -> Result<(), TaxiError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("TAXI_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }
    if let Some(val) = lookup("TAXI_SECRET_KEY") {
        settings.secret_key = val;
    }
    if let Some(val) = lookup("TAXI_LOG_LEVEL") {
        settings.log_level = val;
    }
    if let Some(val) = lookup("TAXI_LOG_FORMAT") {
        settings.log_format = val.parse().map_err(TaxiError::Configuration)?;
    }
    if let Some(val) = lookup("TAXI_LANGUAGE_CODE") {
        settings.language_code = val;
    }
    if let Some(val) = lookup("TAXI_TIME_ZONE") {
        settings.time_zone = val;
    }
    if let Some(val) = lookup("TAXI_PASSWORD_MIN_LENGTH") {
        settings.password_min_length = val.parse().map_err(|e| {
            TaxiError::Configuration(format!("TAXI_PASSWORD_MIN_LENGTH: {e}"))
        })?;
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<String, TaxiError> {
    std::fs::read_to_string(path).map_err(|e| {
        TaxiError::Configuration(format!(
            "Failed to read settings file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, TaxiError> {
    let defaults = serde_json::to_value(Settings::default()).map_err(|e| {
        TaxiError::Configuration(format!("Failed to serialize default settings: {e}"))
    })?;
    serde_json::from_value(merge_json(defaults, value)).map_err(|e| {
        TaxiError::Configuration(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges `overlay` into `base`; objects merge key by key, anything
/// else is replaced.
fn merge_json(base: serde_json::Value, overlay: serde_json::Value) -> serde_json::Value {
    match (base, overlay) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, overlay_v) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_v) => merge_json(base_v, overlay_v),
                    None => overlay_v,
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

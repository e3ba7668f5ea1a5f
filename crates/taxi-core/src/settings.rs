//! Application settings.
//!
//! [`Settings`] holds every knob the taxi service reads at startup. All
//! fields have defaults so a partial TOML or JSON file is enough; see
//! [`settings_loader`](crate::settings_loader) for how files and the
//! environment are layered on top.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
    /// Single-line, human-readable output.
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
            Self::Compact => "compact",
        };
        write!(f, "{name}")
    }
}

/// The complete set of application settings.
///
/// # Examples
///
/// ```
/// use taxi_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.auth_user_model, "taxi.Driver");
/// assert_eq!(settings.password_min_length, 8);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The secret key used for signing.
    pub secret_key: String,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter directive (e.g. "info", "taxi=debug,warn").
    pub log_level: String,
    /// Log output format. Debug mode always uses pretty output.
    pub log_format: LogFormat,

    // ── Internationalization ─────────────────────────────────────────

    /// The language code (e.g. "en-us").
    pub language_code: String,
    /// The default time zone.
    pub time_zone: String,

    // ── Auth ─────────────────────────────────────────────────────────

    /// The model used for users, as `app_label.ModelName`.
    pub auth_user_model: String,
    /// Minimum length enforced by the password validators.
    pub password_min_length: usize,
    /// Algorithm used for new password hashes ("argon2" or "pbkdf2_sha256").
    pub password_hasher: String,
    /// Iteration count for the PBKDF2 hasher.
    pub pbkdf2_iterations: u32,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Settings that don't fit the fields above.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            secret_key: String::new(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            language_code: "en-us".to_string(),
            time_zone: "UTC".to_string(),
            auth_user_model: "taxi.Driver".to_string(),
            password_min_length: 8,
            password_hasher: "argon2".to_string(),
            pbkdf2_iterations: 600_000,
            extra: HashMap::new(),
        }
    }
}

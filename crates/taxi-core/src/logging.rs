//! Logging setup built on [`tracing`].
//!
//! Library crates only emit `tracing` events; binaries call
//! [`setup_logging`] once at startup.

use crate::settings::{LogFormat, Settings};

/// Installs the global tracing subscriber described by `settings`.
///
/// The filter comes from `settings.log_level` and falls back to `info`
/// when the directive does not parse. Debug mode always logs in the
/// pretty format. Calling this twice is harmless: the second call is a
/// no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let format = if settings.debug {
        LogFormat::Pretty
    } else {
        settings.log_format
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Pretty => builder
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok(),
        LogFormat::Json => builder.json().try_init().ok(),
        LogFormat::Compact => builder.compact().try_init().ok(),
    };
}

/// Creates the span that wraps validation of one form.
///
/// # Examples
///
/// ```
/// use taxi_core::logging::form_span;
///
/// let span = form_span("DriverCreationForm");
/// let _guard = span.enter();
/// tracing::debug!("validating");
/// ```
pub fn form_span(form_name: &str) -> tracing::Span {
    tracing::debug_span!("form", name = form_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_is_noop() {
        let settings = Settings {
            debug: false,
            log_format: LogFormat::Compact,
            log_level: "not a [valid directive".to_string(),
            ..Settings::default()
        };
        setup_logging(&settings);
        setup_logging(&Settings::default());
    }

    #[test]
    fn test_form_span_enter() {
        let span = form_span("CarForm");
        let _guard = span.enter();
        tracing::debug!("inside form span");
    }
}

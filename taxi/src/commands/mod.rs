//! The `taxi` subcommands.

mod car;
mod check_license;
mod create_driver;
mod update_license;

pub use car::CarCommand;
pub use check_license::CheckLicenseCommand;
pub use create_driver::CreateDriverCommand;
pub use update_license::UpdateLicenseCommand;

use serde::de::DeserializeOwned;
use taxi_core::{TaxiError, TaxiResult};
use taxi_forms::Form;
use taxi_http::QueryDict;

use crate::command::{CommandOutput, CommandRegistry};

/// Registers every built-in subcommand.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(CheckLicenseCommand));
    registry.register(Box::new(CreateDriverCommand));
    registry.register(Box::new(UpdateLicenseCommand));
    registry.register(Box::new(CarCommand));
}

fn data_arg() -> clap::Arg {
    clap::Arg::new("data")
        .long("data")
        .value_name("URLENCODED")
        .default_value("")
        .help("Submitted form data, e.g. 'username=jdoe&license_number=ABC12345'")
}

fn form_data(matches: &clap::ArgMatches) -> QueryDict {
    QueryDict::parse(
        matches
            .get_one::<String>("data")
            .map_or("", String::as_str),
    )
}

/// Reads a JSON argument given inline or, with a leading `@`, from a file.
async fn json_arg<T: DeserializeOwned>(matches: &clap::ArgMatches, name: &str) -> TaxiResult<T> {
    let raw = matches
        .get_one::<String>(name)
        .ok_or_else(|| TaxiError::Configuration(format!("--{name} is required")))?;
    let text = match raw.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => raw.clone(),
    };
    serde_json::from_str(&text)
        .map_err(|e| TaxiError::Serialization(format!("--{name}: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> TaxiResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| TaxiError::Serialization(e.to_string()))
}

fn rejected(form: &dyn Form) -> CommandOutput {
    CommandOutput::invalid(serde_json::json!({
        "valid": false,
        "errors": form.errors_as_json(),
    }))
}

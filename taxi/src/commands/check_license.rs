//! `taxi check-license <VALUE>`

use async_trait::async_trait;
use taxi_core::{Settings, TaxiResult};

use crate::command::{CommandOutput, ManagementCommand};
use crate::license::validate_license_number;

/// Checks one license number against the format rule.
pub struct CheckLicenseCommand;

#[async_trait]
impl ManagementCommand for CheckLicenseCommand {
    fn name(&self) -> &'static str {
        "check-license"
    }

    fn help(&self) -> &'static str {
        "Check a driver license number"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("value")
                .required(true)
                .allow_hyphen_values(true)
                .help("The license number, exactly as entered"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        _settings: &Settings,
    ) -> TaxiResult<CommandOutput> {
        let value = matches
            .get_one::<String>("value")
            .map_or("", String::as_str);
        Ok(match validate_license_number(value) {
            Ok(license_number) => CommandOutput::valid(serde_json::json!({
                "valid": true,
                "license_number": license_number,
            })),
            Err(error) => CommandOutput::invalid(serde_json::json!({
                "valid": false,
                "errors": {
                    "license_number": [{ "message": error.message, "code": error.code }],
                },
            })),
        })
    }
}

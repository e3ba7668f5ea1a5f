//! `taxi update-license --driver <JSON> --data <URLENCODED>`

use async_trait::async_trait;
use taxi_core::{Settings, TaxiResult};
use taxi_forms::Form;

use super::{data_arg, form_data, json_arg, rejected, to_json};
use crate::command::{CommandOutput, ManagementCommand};
use crate::forms::DriverLicenseUpdateForm;
use crate::models::Driver;

/// Validates a license number change for an existing driver.
pub struct UpdateLicenseCommand;

#[async_trait]
impl ManagementCommand for UpdateLicenseCommand {
    fn name(&self) -> &'static str {
        "update-license"
    }

    fn help(&self) -> &'static str {
        "Validate a new license number for a driver"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("driver")
                .long("driver")
                .required(true)
                .value_name("JSON")
                .help("The driver being edited, as JSON or @file"),
        )
        .arg(data_arg())
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        _settings: &Settings,
    ) -> TaxiResult<CommandOutput> {
        let driver: Driver = json_arg(matches, "driver").await?;
        let mut form = DriverLicenseUpdateForm::new(driver)?;
        form.bind(&form_data(matches));
        if !form.is_valid().await {
            return Ok(rejected(&form));
        }
        let driver = form.save()?;
        Ok(CommandOutput::valid(serde_json::json!({
            "valid": true,
            "driver": to_json(&driver)?,
        })))
    }
}

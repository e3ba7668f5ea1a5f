//! `taxi create-driver --data <URLENCODED>`

use std::sync::Arc;

use async_trait::async_trait;
use taxi_auth::hashers::hasher_from_settings;
use taxi_auth::PasswordPolicy;
use taxi_core::{Settings, TaxiResult};
use taxi_forms::Form;

use super::{data_arg, form_data, rejected, to_json};
use crate::command::{CommandOutput, ManagementCommand};
use crate::forms::DriverCreationForm;

/// Validates a driver registration and prints the unsaved driver.
pub struct CreateDriverCommand;

#[async_trait]
impl ManagementCommand for CreateDriverCommand {
    fn name(&self) -> &'static str {
        "create-driver"
    }

    fn help(&self) -> &'static str {
        "Validate a driver registration"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(data_arg())
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> TaxiResult<CommandOutput> {
        let mut form = DriverCreationForm::new()?
            .with_policy(Arc::new(PasswordPolicy::from_settings(settings)))
            .with_hasher(hasher_from_settings(settings)?);
        form.bind(&form_data(matches));
        if !form.is_valid().await {
            return Ok(rejected(&form));
        }
        let driver = form.save().await?;
        tracing::info!(username = %driver.username, "driver registration accepted");
        Ok(CommandOutput::valid(serde_json::json!({
            "valid": true,
            "driver": to_json(&driver)?,
        })))
    }
}

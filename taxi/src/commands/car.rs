//! `taxi car --fixtures <JSON> --data <URLENCODED>`

use async_trait::async_trait;
use serde::Deserialize;
use taxi_core::{Settings, TaxiResult};
use taxi_forms::Form;

use super::{data_arg, form_data, json_arg, rejected, to_json};
use crate::command::{CommandOutput, ManagementCommand};
use crate::forms::CarForm;
use crate::models::{Car, Driver, Manufacturer};

/// The records a car form chooses from, plus the car being edited if any.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Fixtures {
    manufacturers: Vec<Manufacturer>,
    drivers: Vec<Driver>,
    car: Option<Car>,
}

/// Validates a car submission against known manufacturers and drivers.
pub struct CarCommand;

#[async_trait]
impl ManagementCommand for CarCommand {
    fn name(&self) -> &'static str {
        "car"
    }

    fn help(&self) -> &'static str {
        "Validate a car submission"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("fixtures")
                .long("fixtures")
                .required(true)
                .value_name("JSON")
                .help("{\"manufacturers\": [..], \"drivers\": [..], \"car\": {..}} as JSON or @file"),
        )
        .arg(data_arg())
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        _settings: &Settings,
    ) -> TaxiResult<CommandOutput> {
        let fixtures: Fixtures = json_arg(matches, "fixtures").await?;
        let mut form = match fixtures.car {
            Some(car) => CarForm::for_instance(car, &fixtures.manufacturers, &fixtures.drivers)?,
            None => CarForm::new(&fixtures.manufacturers, &fixtures.drivers)?,
        };
        form.bind(&form_data(matches));
        if !form.is_valid().await {
            return Ok(rejected(&form));
        }
        let car = form.save()?;
        Ok(CommandOutput::valid(serde_json::json!({
            "valid": true,
            "car": to_json(&car)?,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandRegistry;

    const FIXTURES: &str = r#"{
        "manufacturers": [{"id": 1, "name": "Toyota", "country": "Japan"}],
        "drivers": [
            {"id": 3, "username": "amir", "license_number": "AMR00001"},
            {"id": 5, "username": "bea", "license_number": "BEA00002"}
        ]
    }"#;

    async fn run(fixtures: &str, data: &str) -> CommandOutput {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(CarCommand));
        let matches = registry
            .build_cli()
            .try_get_matches_from(["taxi", "car", "--fixtures", fixtures, "--data", data])
            .unwrap();
        registry
            .execute(&matches, &Settings::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_car_without_drivers() {
        let output = run(FIXTURES, "model=Prius&manufacturer=1").await;
        assert!(output.valid);
        assert_eq!(output.body["car"]["model"], "Prius");
        assert_eq!(output.body["car"]["drivers"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_driver_rejected() {
        let output = run(FIXTURES, "model=Prius&manufacturer=1&drivers=3&drivers=8").await;
        assert!(!output.valid);
        assert_eq!(
            output.body["errors"]["drivers"][0]["code"],
            "invalid_choice"
        );
    }

    #[tokio::test]
    async fn test_edit_existing_car() {
        let fixtures = FIXTURES.replacen(
            "\"drivers\"",
            "\"car\": {\"id\": 2, \"model\": \"Prius\", \"manufacturer\": 1, \"drivers\": [3]}, \"drivers\"",
            1,
        );
        let output = run(&fixtures, "model=Prius+Prime&manufacturer=1&drivers=5").await;
        assert!(output.valid);
        assert_eq!(output.body["car"]["id"], 2);
        assert_eq!(output.body["car"]["drivers"], serde_json::json!([5]));
    }
}

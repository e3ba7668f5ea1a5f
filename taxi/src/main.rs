//! `taxi` command-line tool.

use std::process::ExitCode;

use anyhow::Context;
use taxi::command::{CommandRegistry, SETTINGS_ARG};
use taxi::commands::register_builtin_commands;
use taxi_core::logging::setup_logging;
use taxi_core::settings_loader;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);
    let matches = registry.build_cli().get_matches();

    let settings = match matches.get_one::<String>(SETTINGS_ARG) {
        Some(path) => settings_loader::from_file_with_env(path)
            .with_context(|| format!("loading settings from {path}"))?,
        None => settings_loader::from_env().context("reading settings from the environment")?,
    };
    setup_logging(&settings);

    let output = registry.execute(&matches, &settings).await?;
    println!("{}", serde_json::to_string_pretty(&output.body)?);
    Ok(if output.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

//! Command framework for the `taxi` binary.
//!
//! Each subcommand implements [`ManagementCommand`] and is registered in a
//! [`CommandRegistry`], which builds the clap parser and dispatches to the
//! matching handler.

use std::collections::HashMap;

use async_trait::async_trait;
use taxi_core::{Settings, TaxiError, TaxiResult};

/// Name of the global option pointing at a settings file.
pub const SETTINGS_ARG: &str = "settings";

/// What a command produced: a JSON document and whether the submitted data
/// was valid. Invalid data is not an error; the binary prints the document
/// either way and exits non-zero when `valid` is false.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub valid: bool,
    pub body: serde_json::Value,
}

impl CommandOutput {
    pub const fn valid(body: serde_json::Value) -> Self {
        Self { valid: true, body }
    }

    pub const fn invalid(body: serde_json::Value) -> Self {
        Self { valid: false, body }
    }
}

/// A subcommand of the `taxi` binary.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// The name the command is invoked by.
    fn name(&self) -> &'static str;

    /// One-line description for `--help`.
    fn help(&self) -> &'static str;

    /// Adds the command's arguments. The default adds none.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Runs the command.
    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> TaxiResult<CommandOutput>;
}

/// Registered commands, keyed by name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Box<dyn ManagementCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command, replacing any with the same name.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        self.commands.insert(command.name(), command);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Returns the registered names, sorted.
    pub fn list_commands(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Builds the top-level parser with every registered subcommand and
    /// the global `--settings` option.
    pub fn build_cli(&self) -> clap::Command {
        let mut app = clap::Command::new("taxi")
            .about("Validate fleet driver, license and car submissions")
            .subcommand_required(true)
            .arg(
                clap::Arg::new(SETTINGS_ARG)
                    .long(SETTINGS_ARG)
                    .global(true)
                    .value_name("PATH")
                    .help("Settings file (TOML, or JSON by .json extension)"),
            );

        for name in self.list_commands() {
            let cmd = &self.commands[name];
            let subcmd = clap::Command::new(name).about(cmd.help());
            app = app.subcommand(cmd.add_arguments(subcmd));
        }
        app
    }

    /// Dispatches to the subcommand named in `matches`.
    pub async fn execute(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> TaxiResult<CommandOutput> {
        let (name, sub_matches) = matches
            .subcommand()
            .ok_or_else(|| TaxiError::Configuration("No subcommand specified".to_string()))?;
        let cmd = self
            .get(name)
            .ok_or_else(|| TaxiError::Configuration(format!("Unknown command: {name}")))?;
        tracing::debug!(command = name, "running command");
        cmd.handle(sub_matches, settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoCommand;

    #[async_trait]
    impl ManagementCommand for EchoCommand {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn help(&self) -> &'static str {
            "Print the argument back"
        }

        fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
            cmd.arg(clap::Arg::new("text").required(true))
        }

        async fn handle(
            &self,
            matches: &clap::ArgMatches,
            _settings: &Settings,
        ) -> TaxiResult<CommandOutput> {
            let text = matches
                .get_one::<String>("text")
                .cloned()
                .unwrap_or_default();
            Ok(CommandOutput::valid(serde_json::json!({ "text": text })))
        }
    }

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry.register(Box::new(EchoCommand));
        registry
    }

    #[test]
    fn test_register_and_list() {
        let registry = registry();
        assert_eq!(registry.list_commands(), vec!["echo"]);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[tokio::test]
    async fn test_execute() {
        let registry = registry();
        let matches = registry
            .build_cli()
            .try_get_matches_from(["taxi", "echo", "hello"])
            .unwrap();
        let output = registry
            .execute(&matches, &Settings::default())
            .await
            .unwrap();
        assert!(output.valid);
        assert_eq!(output.body["text"], "hello");
    }

    #[test]
    fn test_settings_is_global() {
        let matches = registry()
            .build_cli()
            .try_get_matches_from(["taxi", "echo", "hi", "--settings", "taxi.toml"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>(SETTINGS_ARG).map(String::as_str),
            Some("taxi.toml")
        );
    }

    #[test]
    fn test_subcommand_required() {
        assert!(registry().build_cli().try_get_matches_from(["taxi"]).is_err());
    }
}

//! CLI interface module

pub mod commands;

use crate::cli::{Commands, ConfigCommands};
use commands::{config_check, config_generate, generate_deck};
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    ConfigError(String),
    InputError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::ConfigError(msg) => format!("Config error: {}", msg),
            CliError::InputError(msg) => format!("Input error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::ConfigError(msg) => {
                format!("{} {}", "Config error:".red().bold(), msg.white())
            }
            CliError::InputError(msg) => {
                format!("{} {}", "Input error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::SlideforgeError> for CliError {
    fn from(err: crate::errors::SlideforgeError) -> Self {
        match err {
            crate::errors::SlideforgeError::Config(msg) => CliError::ConfigError(msg),
            crate::errors::SlideforgeError::Validation(msg) => CliError::InputError(msg),
            other => CliError::CommandError(other.format_simple()),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::ConfigError(format!("{:#}", err))
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::Generate {
            summary,
            slides,
            output,
            profile,
        } => generate_deck(summary, slides, output, profile).await,

        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => {
                config_generate(output_path, force).await
            }
            ConfigCommands::Check => config_check().await,
        },

        Commands::Serve => Err(CliError::CommandError(
            "serve is handled by the server mode".to_string(),
        )),
    }
}

//! Config commands

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use strum::EnumMessage;

use crate::config::{StaticConfig, ValidationMode, get_config, validate_config};
use crate::interfaces::cli::CliError;

const DEFAULT_SAMPLE_PATH: &str = "config.example.toml";

/// Generate example configuration file
pub async fn config_generate(output_path: Option<String>, force: bool) -> Result<(), CliError> {
    let path = output_path.unwrap_or_else(|| DEFAULT_SAMPLE_PATH.to_string());

    // 文件已存在且未指定 --force 时交互确认
    if !force && Path::new(&path).exists() && !confirm_overwrite(&path)? {
        println!("{}", "Aborted.".red());
        return Ok(());
    }

    println!(
        "{} {}",
        "Generating configuration file...".yellow(),
        path.blue()
    );

    StaticConfig::default().save_to_file(&path).map_err(|e| {
        CliError::CommandError(format!("Unable to write configuration file: {}", e))
    })?;

    println!(
        "  {} {}",
        "Configuration file generated successfully".green(),
        path.blue()
    );
    println!(
        "  {}",
        "Fill in the OpenAI and Cloudinary credentials before starting the server".dimmed()
    );
    Ok(())
}

fn confirm_overwrite(path: &str) -> Result<bool, CliError> {
    print!(
        "{} {} {}",
        "File already exists:".yellow(),
        path.blue(),
        "Overwrite? [y/N] ".yellow()
    );
    io::stdout()
        .flush()
        .map_err(|e| CliError::CommandError(e.to_string()))?;

    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .map_err(|e| CliError::InputError(e.to_string()))?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Validate the loaded configuration and print every problem
pub async fn config_check() -> Result<(), CliError> {
    let config = get_config();
    let profile = config.deck.profile;
    println!(
        "{} {} ({})",
        "Profile:".bold(),
        profile.to_string().cyan(),
        profile.get_message().unwrap_or_default().dimmed()
    );
    println!(
        "{} {}",
        "API key:".bold(),
        if config.api_key_enforced() {
            "required".yellow()
        } else {
            "not required".dimmed()
        }
    );

    match validate_config(&config, ValidationMode::Serve) {
        Ok(()) => {
            println!("{} Configuration is valid", "✓".bold().green());
            Ok(())
        }
        Err(problems) => {
            for problem in &problems {
                println!("  {} {}", "✗".red(), problem);
            }
            Err(CliError::ConfigError(format!(
                "{} problem(s) found",
                problems.len()
            )))
        }
    }
}

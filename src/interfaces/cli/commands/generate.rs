//! Generate command

use std::path::{Path, PathBuf};

use colored::Colorize;
use serde_json::json;

use crate::api::services::{GenerateRequest, RequestRules};
use crate::config::{Profile, StaticConfig, ValidationMode, get_config};
use crate::interfaces::cli::CliError;
use crate::runtime::lifetime::startup::prepare_service;
use crate::services::presentation::write_deck;

/// `@path` 读取文件，否则原样返回
pub fn resolve_summary(raw: &str) -> Result<String, CliError> {
    match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| CliError::InputError(format!("Cannot read summary file {}: {}", path, e))),
        None => Ok(raw.to_string()),
    }
}

pub async fn generate_deck(
    summary: String,
    slides: u32,
    output: Option<PathBuf>,
    profile: Option<Profile>,
) -> Result<(), CliError> {
    let mut config: StaticConfig = (*get_config()).clone();
    if let Some(profile) = profile {
        config.deck.profile = profile;
    }

    let summary = resolve_summary(&summary)?;
    let request = RequestRules::from_config(&config.deck)
        .validate(&GenerateRequest {
            slide_count: Some(json!(slides)),
            summary: Some(json!(summary)),
        })
        .map_err(|e| CliError::InputError(e.error))?;

    let mode = if output.is_some() {
        ValidationMode::LocalOnly
    } else {
        ValidationMode::Serve
    };
    let service = prepare_service(&config, mode).await?;

    println!(
        "{} {} content slides ({} profile)...",
        "Generating".yellow(),
        request.slide_count.to_string().cyan(),
        config.deck.profile
    );

    match output {
        Some(path) => {
            let deck = service
                .build_deck(request.slide_count, &request.summary)
                .await?;
            let (dir, file_name) = split_output(&path)?;
            let written = write_deck(dir, &file_name, &deck.bytes).await?;
            println!(
                "{} Wrote '{}' ({} slides, {} bytes) to {}",
                "✓".bold().green(),
                deck.title,
                deck.slide_count,
                deck.bytes.len(),
                written.display().to_string().blue()
            );
        }
        None => {
            let deck = service
                .generate(request.slide_count, &request.summary)
                .await?;
            println!(
                "{} Presentation ({} slides, {} bytes, {}): {}",
                "✓".bold().green(),
                deck.slide_count,
                deck.bytes,
                deck.source.as_str(),
                deck.url.blue().underline()
            );
        }
    }
    Ok(())
}

/// 拆分为目录与文件名；裸文件名写入当前目录
fn split_output(path: &Path) -> Result<(&Path, String), CliError> {
    let file_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| CliError::InputError(format!("Invalid output path: {}", path.display())))?
        .to_string();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Ok((dir, file_name))
}

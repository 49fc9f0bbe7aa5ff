//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Profile;

/// slideforge - turn a text summary into a styled PPTX deck
#[derive(Parser)]
#[command(name = "slideforge")]
#[command(version)]
#[command(about = "Generate presentation decks from a text summary", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default when no command is given)
    Serve,

    /// Generate one presentation from the terminal
    ///
    /// Usage: generate --summary "text" --slides 5
    ///        generate --summary @notes.txt --slides 8 --output deck.pptx
    Generate {
        /// Summary text, or @path to read it from a file
        #[arg(long, short = 's')]
        summary: String,

        /// Number of content slides
        #[arg(long, short = 'n', default_value_t = 5)]
        slides: u32,

        /// Write the deck to this path instead of uploading it
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Override the configured profile
        #[arg(long)]
        profile: Option<Profile>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Load and validate the current configuration
    Check,
}

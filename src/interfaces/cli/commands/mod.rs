pub mod config;
pub mod generate;

pub use config::{config_check, config_generate};
pub use generate::{generate_deck, resolve_summary};

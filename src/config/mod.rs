mod r#impl;
mod structs;
pub mod types;
pub mod validators;

pub use r#impl::{get_config, init_config, init_config_from, try_get_config};
pub use structs::*;
pub use types::{LogFormat, Profile};
pub use validators::{ValidationMode, validate_config};

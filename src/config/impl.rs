use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .load_full()
}

/// Try to get the global configuration without panicking
pub fn try_get_config() -> Option<Arc<StaticConfig>> {
    CONFIG.get().map(|c| c.load_full())
}

/// Initialize the global configuration
///
/// Loads configuration from `path` (default "config.toml") plus `SF__*`
/// environment variables. Missing files fall back to in-memory defaults.
///
/// # Examples
/// ```no_run
/// use slideforge::config::init_config;
/// init_config(None);
/// ```
pub fn init_config(path: Option<&str>) {
    CONFIG.get_or_init(|| ArcSwap::from_pointee(StaticConfig::load(path)));
}

/// Initialize the global configuration from an already built value
///
/// Used by tests and by the CLI after applying command-line overrides.
/// Replaces the current value if one is already installed.
pub fn init_config_from(config: StaticConfig) {
    match CONFIG.get() {
        Some(existing) => existing.store(Arc::new(config)),
        None => {
            if let Err(config) = CONFIG.set(ArcSwap::from_pointee(config)) {
                // 并发初始化时另一线程已写入，覆盖之
                if let Some(existing) = CONFIG.get() {
                    existing.store(config.load_full());
                }
            }
        }
    }
}

use std::path::PathBuf;

use storefront_config::{default_base_dir, ConfigError, ConfigManager};

/// Application data root (`$STOREFRONT_HOME` or `~/.storefront`).
pub fn app_home() -> PathBuf {
    default_base_dir()
}

pub fn config_manager() -> Result<ConfigManager, ConfigError> {
    ConfigManager::with_base_dir(app_home())
}

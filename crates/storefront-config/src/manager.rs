use std::{
    env,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::{Config, ConfigError};

/// Overrides the application data directory.
pub const HOME_ENV: &str = "STOREFRONT_HOME";
const APP_DIR: &str = ".storefront";
const STAGING_SUFFIX: &str = "json.partial";

/// `$STOREFRONT_HOME`, else `~/.storefront`, else `./.storefront`.
pub fn default_base_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Loads and atomically saves [`Config`] as pretty JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        fs::create_dir_all(&config_dir)?;
        Ok(Self::new(config_dir.join("config.json")))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Missing file yields defaults.
    /// Missing file yields defaults; unknown keys are ignored and absent ones
    /// fall back to their defaults.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match fs::read_to_string(&self.config_path) {
            Ok(raw) => parse_config(&raw),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes to a staging file next to the target and renames it into place,
    /// so a crash never leaves a half-written config behind.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let dir = self
            .config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = dir {
            fs::create_dir_all(dir)?;
        }
        let body = serde_json::to_vec_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;

        let staging = self.config_path.with_extension(STAGING_SUFFIX);
        if let Err(err) = write_synced(&staging, &body) {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }
        fs::rename(&staging, &self.config_path)?;
        Ok(())
    }
}

fn parse_config(raw: &str) -> Result<Config, ConfigError> {
    serde_json::from_str(raw).map_err(|err| ConfigError::Serde(err.to_string()))
}

fn write_synced(path: &Path, body: &[u8]) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(body)?;
    file.sync_all()?;
    Ok(())
}

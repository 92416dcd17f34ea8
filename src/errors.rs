use storefront_config::ConfigError;
use storefront_engine::CoreError;
use thiserror::Error;

/// Top-level error for library consumers of the root crate.
#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid profile file: {0}")]
    InvalidProfile(String),
}

/// Failures that end the shell loop.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

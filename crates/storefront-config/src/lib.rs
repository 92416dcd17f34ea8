//! storefront-config
//!
//! Persistent preferences for the storefront wizard shell: validation
//! limits, default wizard mode, output settings, and their on-disk home.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::{default_base_dir, ConfigManager, HOME_ENV};
pub use model::{AccessibilitySettings, Config};

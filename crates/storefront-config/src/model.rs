use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// User preferences for the wizard shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_mode_value")]
    pub default_mode: String,
    #[serde(default = "Config::default_password_min_length")]
    pub password_min_length: usize,
    #[serde(default = "Config::default_max_video_seconds")]
    pub max_video_seconds: u32,
    /// Replaces the derived required-field policy when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_fields: Option<Vec<String>>,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default)]
    pub accessibility: AccessibilitySettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: Self::default_mode_value(),
            password_min_length: Self::default_password_min_length(),
            max_video_seconds: Self::default_max_video_seconds(),
            required_fields: None,
            ui_color_enabled: Self::default_ui_color_enabled(),
            accessibility: AccessibilitySettings::default(),
            log_filter: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 7] = [
        "default_mode",
        "password_min_length",
        "max_video_seconds",
        "required_fields",
        "ui_color_enabled",
        "plain_output",
        "log_filter",
    ];

    pub fn default_mode_value() -> String {
        "register".into()
    }

    pub fn default_password_min_length() -> usize {
        6
    }

    pub fn default_max_video_seconds() -> u32 {
        60
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    /// Current value of `key`, rendered for display.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "default_mode" => self.default_mode.clone(),
            "password_min_length" => self.password_min_length.to_string(),
            "max_video_seconds" => self.max_video_seconds.to_string(),
            "required_fields" => self
                .required_fields
                .as_ref()
                .map(|fields| fields.join(","))
                .unwrap_or_else(|| "(derived)".into()),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "plain_output" => self.accessibility.plain_output.to_string(),
            "log_filter" => self.log_filter.clone().unwrap_or_else(|| "(default)".into()),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Parses `value` and stores it under `key`.
    ///
    /// `required_fields` takes a comma-separated list; `-` clears the
    /// optional keys back to their defaults.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let trimmed = value.trim();
        match key {
            "default_mode" => match trimmed.to_ascii_lowercase().as_str() {
                mode @ ("register" | "upgrade") => self.default_mode = mode.to_string(),
                _ => return Err(invalid()),
            },
            "password_min_length" => {
                self.password_min_length = trimmed.parse().map_err(|_| invalid())?;
            }
            "max_video_seconds" => {
                let seconds: u32 = trimmed.parse().map_err(|_| invalid())?;
                if seconds == 0 {
                    return Err(invalid());
                }
                self.max_video_seconds = seconds;
            }
            "required_fields" => {
                self.required_fields = if trimmed == "-" {
                    None
                } else {
                    let fields: Vec<String> = trimmed
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string)
                        .collect();
                    Some(fields)
                };
            }
            "ui_color_enabled" => self.ui_color_enabled = parse_bool(trimmed).ok_or_else(invalid)?,
            "plain_output" => {
                self.accessibility.plain_output = parse_bool(trimmed).ok_or_else(invalid)?
            }
            "log_filter" => {
                self.log_filter = (trimmed != "-" && !trimmed.is_empty()).then(|| trimmed.into());
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    pub fn entries(&self) -> Vec<(&'static str, String)> {
        Self::KEYS
            .iter()
            .filter_map(|key| self.get(key).ok().map(|value| (*key, value)))
            .collect()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilitySettings {
    #[serde(default)]
    pub plain_output: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_parses_typed_values() {
        let mut config = Config::default();
        config.set("password_min_length", "8").unwrap();
        config.set("plain_output", "on").unwrap();
        config.set("required_fields", "storeName, email,").unwrap();

        assert_eq!(config.password_min_length, 8);
        assert!(config.accessibility.plain_output);
        assert_eq!(
            config.required_fields,
            Some(vec!["storeName".to_string(), "email".to_string()])
        );
    }

    #[test]
    fn set_rejects_bad_values_and_keys() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("default_mode", "wizard"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("max_video_seconds", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("currency", "USD"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn dash_clears_optional_keys() {
        let mut config = Config::default();
        config.set("log_filter", "storefront_core=debug").unwrap();
        config.set("log_filter", "-").unwrap();
        assert_eq!(config.log_filter, None);
        assert_eq!(config.get("required_fields").unwrap(), "(derived)");
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
///
/// Loaded from the config file with env-var overrides on top.
/// Priority: Env > File > Defaults (like a sensible person would do)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load config from the default location, then apply env overrides.
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?
        } else {
            // No config file? Use defaults
            Self::default()
        };

        if let Ok(base_url) = std::env::var("EXACTMAILS_API_URL") {
            if !base_url.is_empty() {
                config.api.base_url = base_url;
            }
        }

        Ok(config)
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("exactmails");

        Ok(config_dir.join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, no trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Redirect URI registered for the Google OAuth flow.
    #[serde(default = "default_redirect_uri")]
    pub google_redirect_uri: String,
}

fn default_base_url() -> String {
    "https://api.exactmails.com".to_string()
}

fn default_redirect_uri() -> String {
    "https://app.exactmails.com/auth/callback/google".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            google_redirect_uri: default_redirect_uri(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// UI theme name (Default Dark, Light)
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Enable mouse support in the TUI
    #[serde(default = "default_mouse")]
    pub mouse_enabled: bool,
}

fn default_theme() -> String {
    "Default Dark".to_string() // because who uses light theme in a terminal?
}

fn default_mouse() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            mouse_enabled: default_mouse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.exactmails.com");
        assert!(config.ui.mouse_enabled);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("base_url"));
        assert!(toml.contains("theme"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[api]\nbase_url = \"http://localhost:8000\"\n").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.ui.theme, "Default Dark");
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the audio storage service.
    #[serde(default = "default_server_url")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Locale name, resolved against `<lang_dir>/<locale>.json`.
    #[serde(default = "default_locale")]
    pub locale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Delay between session activation and microphone acquisition, so the
    /// station screen paints before any permission prompt fires.
    #[serde(default = "default_warmup_ms")]
    pub warmup_ms: u64,
}

/// User-configurable paths for translation catalogs and persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `<locale>.json` catalogs.
    #[serde(default = "platform::lang_dir")]
    pub lang_dir: PathBuf,
    /// Directory holding the user token and station registry.
    #[serde(default = "platform::data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            warmup_ms: default_warmup_ms(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            lang_dir: platform::lang_dir(),
            data_dir: platform::data_dir(),
        }
    }
}

fn default_server_url() -> String {
    "http://localhost:7625".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_warmup_ms() -> u64 {
    300
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.url, "http://localhost:7625");
        assert_eq!(config.ui.locale, "en");
        assert_eq!(config.recording.warmup_ms, 300);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[server]\nurl = \"https://fm.example\"\n").unwrap();
        assert_eq!(config.server.url, "https://fm.example");
        assert_eq!(config.ui.locale, "en");
    }
}

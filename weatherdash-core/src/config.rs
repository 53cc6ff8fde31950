use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf, time::Duration};

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "WEATHERSTACK_API_KEY";

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.weatherstack.com";
pub const DEFAULT_SUGGEST_BASE_URL: &str = "https://api.teleport.org";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_FORECAST_DAYS: u8 = 5;
pub const DEFAULT_SUGGESTION_LIMIT: u8 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub fn default_countries() -> Vec<String> {
    ["Dubai-UAE", "USA", "China", "Canada"].into_iter().map(String::from).collect()
}

/// Timing knobs for a [`crate::WeatherFetchService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    pub debounce: Duration,
    pub forecast_days: u8,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            forecast_days: DEFAULT_FORECAST_DAYS,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// debounce_ms = 500
/// countries = ["Dubai-UAE", "USA"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub weather_base_url: String,
    pub suggest_base_url: String,
    pub debounce_ms: u64,
    pub forecast_days: u8,
    pub suggestion_limit: u8,
    pub timeout_secs: u64,
    /// Fixed locations shown as cards under the main panel.
    pub countries: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            suggest_base_url: DEFAULT_SUGGEST_BASE_URL.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            forecast_days: DEFAULT_FORECAST_DAYS,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            countries: default_countries(),
        }
    }
}

impl Config {
    /// Load config from disk (or defaults on first run), then apply the
    /// `WEATHERSTACK_API_KEY` override.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_override(env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_env_override(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            tracing::debug!("using API key from {API_KEY_ENV}");
            self.api_key = Some(key);
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// A missing key is sent as empty and rejected server-side.
    pub fn api_key_or_empty(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            forecast_days: self.forecast_days,
        }
    }
}

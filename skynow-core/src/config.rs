use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{error::WeatherError, model::Coordinates};

/// Environment variable that overrides the API key from the config file.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0";

/// Base URLs of the two OpenWeather APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub weather: String,
    pub geo: String,
    pub timeout_secs: u64,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            weather: DEFAULT_WEATHER_URL.to_string(),
            geo: DEFAULT_GEO_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Endpoints {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Autocomplete tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub suggestion_limit: u8,
    pub debounce_ms: u64,
    /// Longer delay used by flows that submit on their own (map search).
    pub auto_submit_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            suggestion_limit: 5,
            debounce_ms: 300,
            auto_submit_ms: 1000,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn auto_submit(&self) -> Duration {
        Duration::from_millis(self.auto_submit_ms)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// language = "fr"
///
/// [search]
/// debounce_ms = 300
///
/// [location]
/// lat = 4.0511
/// lon = 9.7679
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Language of provider descriptions, e.g. "fr" or "en".
    pub language: String,

    pub endpoints: Endpoints,
    pub search: SearchConfig,

    /// Position used by `locate` when none is given on the command line.
    pub location: Option<Coordinates>,

    /// Where history, favorites and theme live. Defaults to the platform data dir.
    pub state_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "fr".to_string(),
            endpoints: Endpoints::default(),
            search: SearchConfig::default(),
            location: None,
            state_dir: None,
        }
    }
}

impl Config {
    /// Load config from disk (or defaults when absent), then apply the environment.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
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

        tracing::info!(path = %path.display(), "configuration saved");
        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "skynow", "skynow")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding persisted history, favorites and theme.
    pub fn state_dir(&self) -> Result<PathBuf> {
        match &self.state_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().to_path_buf()),
        }
    }

    /// A non-blank environment value replaces the file's key.
    pub fn apply_env_api_key(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }
    }

    /// Set/replace the API key.
    pub fn upsert_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// The configured API key; blank counts as missing.
    pub fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(WeatherError::MissingApiKey)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(matches!(err, WeatherError::MissingApiKey));
        assert!(!cfg.is_configured());
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.upsert_api_key("   ".into());

        assert!(cfg.api_key().is_err());
    }

    #[test]
    fn env_key_overrides_file_key() {
        let mut cfg = Config::default();
        cfg.upsert_api_key("FILE_KEY".into());

        cfg.apply_env_api_key(Some("ENV_KEY".into()));
        assert_eq!(cfg.api_key().expect("key must exist"), "ENV_KEY");
    }

    #[test]
    fn blank_env_key_keeps_file_key() {
        let mut cfg = Config::default();
        cfg.upsert_api_key("FILE_KEY".into());

        cfg.apply_env_api_key(Some("".into()));
        cfg.apply_env_api_key(None);
        assert_eq!(cfg.api_key().expect("key must exist"), "FILE_KEY");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = Config::from_toml(
            r#"
            api_key = "KEY"

            [search]
            debounce_ms = 150

            [location]
            lat = 4.0511
            lon = 9.7679
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.api_key().expect("key must exist"), "KEY");
        assert_eq!(cfg.language, "fr");
        assert_eq!(cfg.search.debounce_ms, 150);
        assert_eq!(cfg.search.suggestion_limit, 5);
        assert_eq!(cfg.endpoints.weather, DEFAULT_WEATHER_URL);
        assert_eq!(cfg.location, Some(Coordinates::new(4.0511, 9.7679)));
    }

    #[test]
    fn explicit_state_dir_wins() {
        let cfg = Config {
            state_dir: Some(PathBuf::from("/tmp/skynow-state")),
            ..Config::default()
        };
        assert_eq!(
            cfg.state_dir().expect("state dir"),
            PathBuf::from("/tmp/skynow-state")
        );
    }
}

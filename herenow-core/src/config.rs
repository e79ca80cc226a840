use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::geo::Coordinates;

/// Environment variable that overrides the configured weather API key.
pub const WEATHER_API_KEY_ENV: &str = "HERENOW_WEATHER_API_KEY";

pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_ROUTING_URL: &str = "https://router.project-osrm.org";
pub const DEFAULT_WEATHER_URL: &str = "https://api.weatherapi.com";
pub const DEFAULT_USER_AGENT: &str = concat!("herenow/", env!("CARGO_PKG_VERSION"));

/// Base URLs of the third-party services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocoding: String,
    pub routing: String,
    pub weather: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding: DEFAULT_GEOCODING_URL.to_string(),
            routing: DEFAULT_ROUTING_URL.to_string(),
            weather: DEFAULT_WEATHER_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Loaded once at startup and handed to [`crate::Session::new`]; nothing in the
/// crate reads it from a global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Example TOML:
    /// weather_api_key = "..."
    pub weather_api_key: Option<String>,

    /// Sent with every outgoing request (Nominatim rejects anonymous clients).
    pub user_agent: String,

    pub endpoints: Endpoints,

    /// Fallback device position when none is given on the command line.
    pub home: Option<Coordinates>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weather_api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            endpoints: Endpoints::default(),
            home: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
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

        tracing::info!("Saved configuration to {}", path.display());
        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "here-and-now", "herenow")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Weather API key, preferring the environment over the file.
    pub fn weather_api_key(&self) -> Option<String> {
        std::env::var(WEATHER_API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.weather_api_key.clone().filter(|k| !k.trim().is_empty()))
    }

    pub fn set_weather_api_key(&mut self, api_key: String) {
        let trimmed = api_key.trim();
        self.weather_api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    pub fn has_weather_api_key(&self) -> bool {
        self.weather_api_key().is_some()
    }
}

/// Application configuration
///
/// Settings are read once at startup from
/// `<config dir>/portfolio-gallery/config.json`:
/// - Linux: ~/.config/portfolio-gallery/config.json
/// - macOS: ~/Library/Application Support/portfolio-gallery/config.json
/// - Windows: %APPDATA%\portfolio-gallery\config.json
///
/// Every field is optional; a missing file means all defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Access key value shipped in the default config
pub const PLACEHOLDER_ACCESS_KEY: &str = "YOUR_ACCESS_KEY";

const CONFIG_DIR: &str = "portfolio-gallery";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog location: a path (relative to the working directory) or an http(s) URL
    pub catalog: String,
    /// Form relay endpoint for the contact page
    pub relay_endpoint: String,
    /// Relay access key
    pub access_key: String,
    /// Address shown when a submission fails
    pub contact_email: String,
    pub initial_category: String,
    pub initial_period: String,
    /// Categories shown when the catalog cannot be loaded
    pub fallback_categories: Vec<String>,
    /// Length of the gallery and lightbox fade transitions
    pub transition_ms: u64,
    /// How long the "message sent" status stays visible
    pub status_clear_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: "data/artworks.json".to_string(),
            relay_endpoint: "https://api.web3forms.com/submit".to_string(),
            access_key: PLACEHOLDER_ACCESS_KEY.to_string(),
            contact_email: "hello@example.com".to_string(),
            initial_category: "illustrations".to_string(),
            initial_period: "2025".to_string(),
            fallback_categories: [
                "illustrations",
                "graphic-design",
                "animation",
                "comics",
                "concept-art",
                "linework",
                "timelapse",
                "storyboards",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            transition_ms: 150,
            status_clear_secs: 5,
        }
    }
}

impl AppConfig {
    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn status_clear_delay(&self) -> Duration {
        Duration::from_secs(self.status_clear_secs)
    }

    /// True while the relay key has not been configured
    pub fn access_key_is_placeholder(&self) -> bool {
        let key = self.access_key.trim();
        key.is_empty() || key == PLACEHOLDER_ACCESS_KEY
    }
}

/// Get the path where the config file is expected
pub fn config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    Some(path)
}

/// Load config from an explicit path. A missing file yields defaults.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load the user's config, falling back to defaults with a warning on any error
pub fn load() -> AppConfig {
    let Some(path) = config_path() else {
        tracing::warn!("could not determine config directory, using defaults");
        return AppConfig::default();
    };

    match load_from_path(&path) {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!(%error, "invalid config, using defaults");
            AppConfig::default()
        }
    }
}

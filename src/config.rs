//! Client configuration.
//!
//! The only setting is the API base URL. It is resolved in order from
//! the `EBOOKHUB_API_URL` environment variable (a `.env` file is
//! honored via dotenvy), then `~/.config/ebookhub-client/config.json`,
//! then the local development default.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
pub(crate) const APP_NAME: &str = "ebookhub-client";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Base URL used when nothing else is configured
const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if not found)
        let _ = dotenvy::dotenv();

        if let Ok(url) = std::env::var("EBOOKHUB_API_URL") {
            return Ok(Self { api_url: url });
        }

        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Base URL with any trailing slash removed, so endpoint paths can
    /// always be appended verbatim.
    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = Config {
            api_url: "http://example.com/".to_string(),
        };
        assert_eq!(config.api_url(), "http://example.com");
    }

    #[test]
    fn default_points_at_local_backend() {
        assert_eq!(Config::default().api_url(), "http://localhost:8000");
    }
}

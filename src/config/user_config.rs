//! User configuration for fmdash
//!
//! This module handles user-configurable settings stored in settings.json.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::Paths;

/// User configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    /// Server ID used for JWT secret and password hash salt
    #[serde(default)]
    pub server_id: String,

    /// Last.fm API key
    #[serde(default)]
    pub lastfm_api_key: String,

    /// Last.fm API secret
    #[serde(default)]
    pub lastfm_api_secret: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            server_id: String::new(),
            lastfm_api_key: String::new(),
            lastfm_api_secret: String::new(),
        }
    }
}

impl UserConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let paths = Paths::get()?;
        let settings_path = paths.settings_path();

        let mut config = if settings_path.exists() {
            let content =
                std::fs::read_to_string(&settings_path).context("Failed to read settings file")?;
            serde_json::from_str(&content).context("Failed to parse settings file")?
        } else {
            let config = Self::default();
            config.save()?;
            config
        };

        // env vars win over the settings file so containerized deployments
        // can supply credentials without editing settings.json
        if let Ok(key) = std::env::var("FMDASH_LASTFM_API_KEY") {
            config.lastfm_api_key = key;
        }
        if let Ok(secret) = std::env::var("FMDASH_LASTFM_API_SECRET") {
            config.lastfm_api_secret = secret;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let paths = Paths::get()?;
        let settings_path = paths.settings_path();

        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(&settings_path, content).context("Failed to write settings file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization() {
        let config = UserConfig {
            server_id: "abc".to_string(),
            lastfm_api_key: "key".to_string(),
            lastfm_api_secret: "secret".to_string(),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("lastfmApiKey"));

        let deserialized: UserConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.lastfm_api_key, "key");
    }
}

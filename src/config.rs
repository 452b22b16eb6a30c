//! Client configuration management.
//!
//! Handles loading and saving the client configuration: the backend base
//! URL, the expiry strategy this deployment uses, and the last username
//! used for login.
//!
//! Configuration is stored at `~/.config/dailybook/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_BASE_URL;
use crate::auth::ExpiryStrategy;

/// Application name used for config/data directory paths
const APP_NAME: &str = "dailybook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configured base URL
const BASE_URL_ENV: &str = "DAILYBOOK_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    /// Exactly one expiry source of truth per deployment; mixing the
    /// out-of-band timestamp with the embedded claim is a known defect.
    #[serde(default)]
    pub expiry_strategy: ExpiryStrategy,
    pub last_username: Option<String>,
}

impl ClientConfig {
    pub fn load() -> Result<Self> {
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

    /// Effective base URL: environment override, then config, then the
    /// hosted default.
    pub fn api_base_url(&self) -> String {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory the credential store writes under.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

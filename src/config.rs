//! Configuration Management
//!
//! Handles persistent configuration storage for aep-explorer: the last-used
//! document location, server override, header string, and mock-backend flag.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Last used OpenAPI document URL or file path
    #[serde(default)]
    pub spec: Option<String>,
    /// Server base URL override
    #[serde(default)]
    pub server: Option<String>,
    /// Raw header string ("K1:V1,K2:V2")
    #[serde(default)]
    pub headers: Option<String>,
    /// Use the in-memory mock backend instead of live HTTP
    #[serde(default)]
    pub mock: bool,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("aep-explorer").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective document location (CLI > config)
    pub fn effective_spec(&self, cli: Option<String>) -> Option<String> {
        cli.or_else(|| self.spec.clone())
    }

    /// Get effective server override (CLI > config)
    pub fn effective_server(&self, cli: Option<String>) -> Option<String> {
        cli.or_else(|| self.server.clone())
    }

    /// Get effective header string (CLI > config)
    pub fn effective_headers(&self, cli: Option<String>) -> String {
        cli.or_else(|| self.headers.clone()).unwrap_or_default()
    }

    /// Remember the last-used settings and save
    pub fn remember(
        &mut self,
        spec: &str,
        server: Option<&str>,
        headers: &str,
        mock: bool,
    ) -> Result<()> {
        self.spec = Some(spec.to_string());
        self.server = server.map(str::to_string);
        self.headers = if headers.is_empty() {
            None
        } else {
            Some(headers.to_string())
        };
        self.mock = mock;
        self.save()
    }
}

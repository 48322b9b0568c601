//! Editor configuration
//!
//! Endpoints and the API key environment variable name. The key itself is
//! never stored in the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the workflow API
    pub api_base_url: String,
    /// Environment variable holding the workflow API key
    pub api_key_env: String,
    /// Base URL of the bot hosting service
    pub bots_base_url: String,
    /// Base URL of the Matrix homeserver used for username checks
    pub matrix_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080/api/v1".to_string(),
            api_key_env: "FLOWDECK_API_KEY".to_string(),
            bots_base_url: "https://bots.pixx.co".to_string(),
            matrix_base_url: "https://matrix.pixx.co".to_string(),
        }
    }
}

impl Config {
    /// Load config from a JSON file, falling back to defaults for any
    /// missing field. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Resolve the API key from the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

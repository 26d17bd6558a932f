//! Client configuration.
//!
//! Loaded from `<config_dir>/permsync/config.toml` when present, or from
//! an explicit `--config` path. CLI flags override individual fields.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub hostname: String,
    pub port: u16,
    pub ssl: bool,
    pub username: String,
    pub password: String,
    /// Verify the server TLS certificate.
    pub verify: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: 9047,
            ssl: false,
            username: String::new(),
            password: String::new(),
            verify: true,
        }
    }
}

/// Returns the path of the default config file.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("permsync/config.toml"))
}

impl ClientConfig {
    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| format!("config parse error: {e}"))
    }

    /// Load from the given path, or from the default location when it
    /// exists, or fall back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match config_file_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };
        let text = std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        Self::from_toml(&text)
    }

    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.hostname, self.port)
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default location looked up by [`Config::load`] when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "rusbit-meta.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub peer_id_prefix: String,
    pub listen_port: u16,
    pub request_timeout: u64, // seconds
    pub numwant: u32,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            peer_id_prefix: "-RM0001-".to_string(),
            listen_port: 6881,
            request_timeout: 15,
            numwant: 50,
            user_agent: concat!("rusbit-meta/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Reads the TOML file at `path` if it exists, otherwise returns the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

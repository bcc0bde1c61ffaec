use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

static CONFIG_FILE: &str = "scubex/config.yaml";

/// Application configuration, loaded from a YAML file.
///
/// Every field has a default, so a missing or empty file still yields a
/// usable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScubexConfig {
    /// Base URL of the species service the scan client talks to.
    pub species_service_url: String,
    /// OBIS occurrence API.
    pub obis_api_url: String,
    /// iNaturalist API used to enrich species with common names and photos.
    pub inaturalist_api_url: String,
    /// Address the species service binds to.
    pub listen_addr: String,
    /// Quiet period before a settled viewport triggers a scan.
    pub quiet_period_ms: u64,
}

impl Default for ScubexConfig {
    fn default() -> Self {
        Self {
            species_service_url: "http://localhost:8080".to_string(),
            obis_api_url: "https://api.obis.org/v3".to_string(),
            inaturalist_api_url: "https://api.inaturalist.org/v1".to_string(),
            listen_addr: "127.0.0.1:8080".to_string(),
            quiet_period_ms: 500,
        }
    }
}

impl ScubexConfig {
    /// Reads the configuration, falling back to defaults when no file exists
    /// at the conventional location. An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&raw)?)
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

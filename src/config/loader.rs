// src/config/loader.rs
//! Configuration loading with path discovery
//!
//! Looks for `acquisition.toml` in an explicit override path, the
//! current directory, then the user config directory, and falls back to
//! defaults when nothing is found. Loaded files are validated before
//! they are handed out.

use crate::config::constants::paths;
use crate::config::AcquisitionConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// File content is not valid TOML for [`AcquisitionConfig`]
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed values failed range validation
    #[error("configuration validation failed: {0}")]
    Validation(#[from] crate::utils::validation::ValidationError),
}

/// Configuration loader with path discovery
pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader using the standard search paths
    pub fn new() -> Self {
        Self {
            search_paths: Self::discover_paths(),
        }
    }

    /// Create a loader restricted to the given paths
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths: paths,
        }
    }

    /// Load the first configuration file found, or defaults when none exists
    pub fn load(&self) -> Result<AcquisitionConfig, ConfigError> {
        for path in &self.search_paths {
            if path.is_file() {
                info!(path = %path.display(), "loading acquisition configuration");
                return Self::load_from_path(path);
            }
            debug!(path = %path.display(), "no configuration file");
        }
        debug!("no configuration file found, using defaults");
        Ok(AcquisitionConfig::default())
    }

    /// Load and validate a specific configuration file
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<AcquisitionConfig, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AcquisitionConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn discover_paths() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Ok(explicit) = std::env::var(paths::CONFIG_PATH_ENV) {
            candidates.push(PathBuf::from(explicit));
        }
        candidates.push(PathBuf::from(paths::CONFIG_FILE_NAME));
        if let Some(home) = std::env::var_os("HOME") {
            candidates.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("emg-acquisition")
                    .join(paths::CONFIG_FILE_NAME),
            );
        }
        candidates
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

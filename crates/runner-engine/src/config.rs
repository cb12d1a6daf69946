use std::path::{Path, PathBuf};

use runner_plan::ValidationPolicy;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Engine settings, usually read from a TOML file.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory of the file-backed state store.
    pub state_dir: PathBuf,
    /// Payload validation for Create.
    pub create_validation: ValidationPolicy,
    /// Payload validation for Update.
    pub update_validation: ValidationPolicy,
    /// Payload validation for Delete.
    pub delete_validation: ValidationPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(".runner/state"),
            create_validation: ValidationPolicy::Strict,
            update_validation: ValidationPolicy::Strict,
            delete_validation: ValidationPolicy::BestEffort,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Read and parse the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// [`load`](Self::load) when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

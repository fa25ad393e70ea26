use super::Result;
use crate::error::ConfigError;
use dirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub default_profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Profile {
    /// Base URL of the table storage endpoint
    pub endpoint: String,
    /// Storage account the SAS token is scoped to
    pub account_name: String,
    /// Name of the SAS definition the token was issued under
    pub sas_definition: String,
    pub timeout_seconds: Option<u64>,
    /// SAS tokens keyed "{account_name}-{sas_definition}". Rotation tooling
    /// rewrites these entries in place; a reload picks them up.
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

impl Profile {
    /// Composed lookup key for this profile's token entry.
    pub fn token_key(&self) -> String {
        format!("{}-{}", self.account_name, self.sas_definition)
    }

    pub fn sas_token(&self) -> Result<&str> {
        let key = self.token_key();
        self.tokens
            .get(&key)
            .map(String::as_str)
            .ok_or(ConfigError::MissingKey { key })
    }
}

impl Config {
    pub fn default() -> Self {
        Self {
            default_profile: None,
            profiles: HashMap::new(),
        }
    }

    /// Load the config, falling back to an empty default when the file does
    /// not exist yet. Used at CLI startup.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::read(&config_path)
    }

    /// Re-read the config from disk, failing if the source is unreachable.
    /// This is the rotation path: a missing file here means the credential
    /// source of truth is gone, not that we should start fresh.
    pub fn reload(path: &Path) -> Result<Self> {
        Self::read(path)
    }

    fn read(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path).map_err(|source| ConfigError::Unavailable {
            path: config_path.to_string_lossy().to_string(),
            reason: source.to_string(),
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Unavailable {
            path: config_path.to_string_lossy().to_string(),
            reason: source.to_string(),
        })
    }

    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::SaveFailed {
                reason: source.to_string(),
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|source| ConfigError::SaveFailed {
            reason: source.to_string(),
        })?;

        fs::write(&config_path, toml_content).map_err(|source| ConfigError::SaveFailed {
            reason: source.to_string(),
        })?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::SaveFailed {
            reason: "no user config directory".to_string(),
        })?;

        Ok(config_dir.join("tabq").join("config.toml"))
    }

    pub fn get_profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }
}

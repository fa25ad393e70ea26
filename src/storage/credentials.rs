use super::Result;
use crate::storage::config::Config;
use std::path::PathBuf;
use std::sync::RwLock;

/// A shared-access credential scoped to one storage account. Replaced
/// wholesale on rotation, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub account: String,
    pub token: String,
}

/// Owns the current credential and knows how to re-read it from its source
/// of truth (the profile's token table on disk). Shared across concurrent
/// queries; `refresh` publishes atomically and is harmless to run
/// redundantly.
pub struct CredentialStore {
    config_path: PathBuf,
    profile_name: String,
    current: RwLock<Option<Credential>>,
}

impl CredentialStore {
    pub fn new(config_path: PathBuf, profile_name: String) -> Self {
        Self {
            config_path,
            profile_name,
            current: RwLock::new(None),
        }
    }

    /// The held credential, loaded from the config source on first use.
    pub fn current(&self) -> Result<Credential> {
        if let Some(credential) = self.current.read().expect("credential lock poisoned").clone()
        {
            return Ok(credential);
        }
        self.refresh()
    }

    /// Re-read the credential from disk and replace the held one. This is a
    /// fresh read of the config file, not of any cached copy, so a token
    /// rotated out of band takes effect without a process restart.
    pub fn refresh(&self) -> Result<Credential> {
        let config = Config::reload(&self.config_path)?;
        let profile = config.get_profile(&self.profile_name)?;
        let credential = Credential {
            account: profile.account_name.clone(),
            token: profile.sas_token()?.to_string(),
        };

        log::debug!(
            "Credential refreshed for account '{}' (profile '{}')",
            credential.account,
            self.profile_name
        );

        *self.current.write().expect("credential lock poisoned") = Some(credential.clone());
        Ok(credential)
    }
}

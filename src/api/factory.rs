use crate::api::client::TableClient;
use crate::error::AppError;
use crate::storage::credentials::CredentialStore;
use std::sync::{Arc, RwLock};

/// Builds and caches the connection handle bound to the current credential.
/// The handle is created lazily once and swapped wholesale on `rebind`; the
/// swap is an atomic publish, so concurrent queries either keep the
/// `Arc` snapshot they already hold or pick up the fresh handle, never a
/// torn one.
pub struct ClientFactory {
    endpoint: String,
    timeout_seconds: Option<u64>,
    credentials: Arc<CredentialStore>,
    current: RwLock<Option<Arc<TableClient>>>,
}

impl ClientFactory {
    pub fn new(
        endpoint: impl Into<String>,
        timeout_seconds: Option<u64>,
        credentials: Arc<CredentialStore>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_seconds,
            credentials,
            current: RwLock::new(None),
        }
    }

    /// The cached handle, built on first use from the current credential.
    /// Two calls with no intervening `rebind` return the same handle.
    pub fn get_client(&self) -> Result<Arc<TableClient>, AppError> {
        if let Some(client) = self.current.read().expect("client lock poisoned").clone() {
            return Ok(client);
        }

        let mut slot = self.current.write().expect("client lock poisoned");
        // Another caller may have built it while we waited for the lock.
        if let Some(client) = slot.clone() {
            return Ok(client);
        }

        let client = Arc::new(self.build()?);
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Force a fresh handle from the credential store's current credential
    /// and replace the cached one. Called after a credential refresh; safe
    /// to run redundantly from concurrent retries (last writer wins).
    pub fn rebind(&self) -> Result<Arc<TableClient>, AppError> {
        let client = Arc::new(self.build()?);
        *self.current.write().expect("client lock poisoned") = Some(client.clone());
        log::debug!("Storage client rebound to endpoint '{}'", self.endpoint);
        Ok(client)
    }

    fn build(&self) -> Result<TableClient, AppError> {
        let credential = self.credentials.current()?;
        Ok(TableClient::new(
            &self.endpoint,
            &credential,
            self.timeout_seconds,
        )?)
    }
}

use crate::api::factory::ClientFactory;
use crate::api::models::{QueryPredicate, TableEntity, TableReference};
use crate::core::query::fetch_all_rows;
use crate::error::{ApiError, AppError};
use crate::storage::credentials::CredentialStore;
use crate::utils::retry::{RetryConfig, RetryExecutor, RetryHook};
use crate::utils::validation::validate_table_name;
use async_trait::async_trait;
use std::sync::Arc;

/// Rotation side effect wired into the retry policy: re-read the credential
/// from its source, then rebind the cached client to it. Refresh before
/// rebind, so the new handle is built from the rotated token.
struct CredentialRotation {
    credentials: Arc<CredentialStore>,
    factory: Arc<ClientFactory>,
}

#[async_trait]
impl RetryHook for CredentialRotation {
    async fn before_retry(&self, attempt: u32, last_error: &ApiError) -> Result<(), AppError> {
        log::info!(
            "Rotating credential before retry {} ({})",
            attempt,
            last_error
        );
        self.credentials.refresh()?;
        self.factory.rebind()?;
        Ok(())
    }
}

/// Table read service: the composition root that wires the retry policy
/// around the paginated query executor.
pub struct TableService {
    factory: Arc<ClientFactory>,
    rotation: CredentialRotation,
    retry: RetryExecutor,
}

impl TableService {
    pub fn new(credentials: Arc<CredentialStore>, factory: Arc<ClientFactory>) -> Self {
        Self::with_retry(credentials, factory, RetryConfig::default())
    }

    pub fn with_retry(
        credentials: Arc<CredentialStore>,
        factory: Arc<ClientFactory>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            rotation: CredentialRotation {
                credentials,
                factory: factory.clone(),
            },
            factory,
            retry: RetryExecutor::new(retry),
        }
    }

    /// Return all rows of the given table, following continuation tokens to
    /// the terminal segment. A rejected credential is rotated and the whole
    /// query restarted, invisibly to the caller; every other failure
    /// propagates as-is and never yields partial results.
    pub async fn get_all<T: TableEntity>(&self, table_name: &str) -> crate::Result<Vec<T>> {
        validate_table_name(table_name)?;
        let table = TableReference::new(table_name);
        let predicate = QueryPredicate::select_all();

        let factory = &self.factory;
        let table = &table;
        let predicate = &predicate;
        self.retry
            .execute(&self.rotation, move || async move {
                // Bind inside the attempt so a retry picks up the rebound
                // handle, not the one the failed attempt used.
                let client = factory.get_client()?;
                Ok(fetch_all_rows(client.as_ref(), table, predicate).await?)
            })
            .await
    }
}

use crate::api::models::{QueryPredicate, QuerySegment, TableEntity, TableReference};
use crate::core::query::SegmentSource;
use crate::error::ApiError;
use crate::storage::credentials::Credential;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("tabq/", env!("CARGO_PKG_VERSION"));

/// A connection handle bound to one storage endpoint using one credential
/// snapshot. Becomes stale the moment that credential is rotated; the
/// factory rebuilds it explicitly, the handle never detects staleness
/// itself.
#[derive(Debug, Clone)]
pub struct TableClient {
    client: Client,
    base_url: String,
    sas_token: String,
}

impl TableClient {
    pub fn new(
        base_url: &str,
        credential: &Credential,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, ApiError> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ApiError::ClientConstructionFailed {
                reason: format!("endpoint '{}' must start with http:// or https://", base_url),
            });
        }
        if credential.token.is_empty() {
            return Err(ApiError::ClientConstructionFailed {
                reason: format!("empty SAS token for account '{}'", credential.account),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(
                timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::ClientConstructionFailed {
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(TableClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sas_token: credential.token.clone(),
        })
    }

    /// Token snapshot this handle was built from.
    pub fn sas_token(&self) -> &str {
        &self.sas_token
    }

    fn build_segment_request(
        &self,
        table: &TableReference,
        predicate: &QueryPredicate,
        continuation: Option<&str>,
    ) -> RequestBuilder {
        let url = format!("{}/tables/{}/rows", self.base_url, table.name());
        let mut request = self
            .client
            .get(url)
            .header(
                "Authorization",
                format!("SharedAccessSignature {}", self.sas_token),
            );

        if let Some(filter) = &predicate.filter {
            request = request.query(&[("filter", filter.as_str())]);
        }
        if let Some(top) = predicate.top {
            request = request.query(&[("top", top.to_string())]);
        }
        if let Some(token) = continuation {
            request = request.query(&[("nextToken", token)]);
        }

        request
    }

    async fn handle_response<T>(&self, response: Response, endpoint: &str) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();

        if status.is_success() {
            response.json::<T>().await.map_err(|e| ApiError::Remote {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            match status.as_u16() {
                // Structured classification: the retry policy keys off this
                // variant, never off message contents.
                401 | 403 => Err(ApiError::AuthenticationFailure {
                    status: status.as_u16(),
                    endpoint: endpoint.to_string(),
                    server_message: error_text,
                }),
                _ => Err(ApiError::Remote {
                    status: status.as_u16(),
                    endpoint: endpoint.to_string(),
                    message: error_text,
                }),
            }
        }
    }
}

#[async_trait]
impl<T: TableEntity> SegmentSource<T> for TableClient {
    async fn fetch_segment(
        &self,
        table: &TableReference,
        predicate: &QueryPredicate,
        continuation: Option<&str>,
    ) -> Result<QuerySegment<T>, ApiError> {
        let endpoint = format!("/tables/{}/rows", table.name());
        let response = self
            .build_segment_request(table, predicate, continuation)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        self.handle_response(response, &endpoint).await
    }
}

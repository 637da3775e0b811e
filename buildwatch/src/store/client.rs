use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::record::{BuildDocument, BuildRecord};
use crate::store::query::SearchWindow;
use crate::store::{BuildStore, StoreError, StoreResult};

/// Default store endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://elasticsearch:9200";

/// Index pattern holding build records.
pub const DEFAULT_INDEX_PATTERN: &str = "mozilla-builds-*";

/// Configuration for the HTTP-backed document store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base endpoint, e.g. `http://elasticsearch:9200`.
    pub endpoint: String,
    /// Index pattern every search runs against.
    pub index_pattern: String,
    /// Request timeout for store calls.
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            index_pattern: DEFAULT_INDEX_PATTERN.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl StoreConfig {
    /// Creates a configuration for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Sets the index pattern searched by every query.
    pub fn with_index_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.index_pattern = pattern.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for an Elasticsearch-style document store.
///
/// Issues `POST {endpoint}/{index_pattern}/_search` with a JSON body built
/// from a [`SearchWindow`] and flattens `hits.hits[*]._source` into
/// [`BuildRecord`]s. Failures surface immediately; there is no retry.
#[derive(Clone)]
pub struct ElasticStore {
    config: Arc<StoreConfig>,
    client: Client,
}

/// Search response envelope, reduced to the fields consumed.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: BuildDocument,
}

impl ElasticStore {
    /// Creates a store client with the given configuration.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        Url::parse(&config.endpoint).map_err(|e| StoreError::Configuration {
            message: format!("Invalid store endpoint {:?}: {e}", config.endpoint),
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Configuration {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Checks that the store answers on its root endpoint.
    pub async fn ping(&self) -> StoreResult<()> {
        let url = format!("{}/", self.base());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(StoreError::connection)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Self::error_response(response).await
        }
    }

    /// The configuration in effect.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn base(&self) -> &str {
        self.config.endpoint.trim_end_matches('/')
    }

    async fn search(&self, window: &SearchWindow) -> StoreResult<SearchResponse> {
        let url = format!("{}/{}/_search", self.base(), self.config.index_pattern);
        let body = window.to_request();

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(StoreError::connection)?;

        self.handle_response(response).await
    }

    /// Handles a successful or error response.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> StoreResult<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| StoreError::Serialization {
                    message: e.to_string(),
                })
        } else {
            Self::error_response(response).await
        }
    }

    /// Converts an error response into a [`StoreError`].
    async fn error_response<T>(response: reqwest::Response) -> StoreResult<T> {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Search { status, message })
    }
}

#[async_trait]
impl BuildStore for ElasticStore {
    #[instrument(skip(self, window), fields(
        index = %self.config.index_pattern,
        gte = %window.gte_expression(),
        size = window.size(),
    ))]
    async fn fetch_builds(&self, window: &SearchWindow) -> StoreResult<Vec<BuildRecord>> {
        let response = self.search(window).await?;
        let records: Vec<BuildRecord> = response
            .hits
            .hits
            .into_iter()
            .map(|hit| hit.source.into())
            .collect();

        debug!(records = records.len(), "Flattened search hits");
        Ok(records)
    }

    fn name(&self) -> &str {
        "elasticsearch"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.endpoint, "http://elasticsearch:9200");
        assert_eq!(config.index_pattern, "mozilla-builds-*");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_builders() {
        let config = StoreConfig::new("http://localhost:9200")
            .with_index_pattern("builds-*")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.endpoint, "http://localhost:9200");
        assert_eq!(config.index_pattern, "builds-*");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_store_creation() {
        let store = ElasticStore::new(StoreConfig::default());
        assert!(store.is_ok());
    }

    #[test]
    fn test_store_creation_rejects_invalid_endpoint() {
        let result = ElasticStore::new(StoreConfig::new("not a url"));
        assert!(matches!(result, Err(StoreError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_fetch_against_unreachable_endpoint() {
        let config =
            StoreConfig::new("http://localhost:1").with_timeout(Duration::from_millis(500));
        let store = ElasticStore::new(config).unwrap();

        let result = store
            .fetch_builds(&SearchWindow::realtime_hours(24))
            .await;
        assert!(matches!(result, Err(StoreError::Connection { .. })));
    }

    #[tokio::test]
    async fn test_ping_against_unreachable_endpoint() {
        let config =
            StoreConfig::new("http://localhost:1").with_timeout(Duration::from_millis(500));
        let store = ElasticStore::new(config).unwrap();

        assert!(store.ping().await.is_err());
    }

    #[test]
    fn test_response_envelope_parses() {
        let response: SearchResponse = serde_json::from_value(json!({
            "took": 3,
            "timed_out": false,
            "hits": {
                "total": {"value": 1, "relation": "eq"},
                "hits": [
                    {
                        "_index": "mozilla-builds-2024.03.14",
                        "_id": "xyz",
                        "_source": {
                            "build_id": "b-9",
                            "elapsed_time": 120.0,
                            "steps": [1, 2],
                            "exit_code": 0,
                            "result_status": "success"
                        }
                    }
                ]
            }
        }))
        .unwrap();

        assert_eq!(response.hits.hits.len(), 1);
        let record: BuildRecord = response.hits.hits.into_iter().next().unwrap().source.into();
        assert_eq!(record.build_id.as_deref(), Some("b-9"));
        assert_eq!(record.step_count, 2);
    }
}

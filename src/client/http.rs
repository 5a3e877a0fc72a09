//! reqwest-backed implementation of [`DogApi`]

use crate::config::SearchConfig;
use crate::core::error::{AdoptError, AdoptResult, ConfigError, FetchError};
use crate::core::model::{
    Dog, Location, LocationSearchRequest, LocationSearchResponse, MatchResponse, SearchResult,
};
use crate::core::query::CanonicalQuery;
use crate::core::service::DogApi;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

const BREEDS: &str = "/dogs/breeds";
const SEARCH: &str = "/dogs/search";
const DOGS: &str = "/dogs";
const MATCH: &str = "/dogs/match";
const LOCATIONS: &str = "/locations";
const LOCATION_SEARCH: &str = "/locations/search";

/// Longest error body kept in a [`FetchError::Status`] message
const MAX_ERROR_BODY: usize = 256;

#[derive(Debug, Error)]
enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
}

impl TransportError {
    fn at(self, endpoint: &str) -> FetchError {
        let endpoint = endpoint.to_string();
        match self {
            TransportError::Http(e) => FetchError::Transport {
                endpoint,
                message: e.to_string(),
            },
            TransportError::Json(e) => FetchError::Decode {
                endpoint,
                message: e.to_string(),
            },
            TransportError::Status { status, body } => FetchError::Status {
                endpoint,
                status,
                message: body,
            },
        }
    }
}

/// Catalog client over HTTP
///
/// Keeps a cookie store so the session cookie set by the login flow (handled
/// outside this crate) travels with every request when the same
/// [`reqwest::Client`] is shared through [`HttpDogApi::with_client`].
#[derive(Debug, Clone)]
pub struct HttpDogApi {
    client: Client,
    base_url: String,
}

impl HttpDogApi {
    /// Build a client from configuration
    pub fn new(config: &SearchConfig) -> AdoptResult<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(|e| {
            AdoptError::Config(ConfigError::InvalidValue {
                field: "http_client".to_string(),
                value: config.base_url.clone(),
                message: e.to_string(),
            })
        })?;

        Ok(Self::with_client(client, config.api_root()))
    }

    /// Use an existing client, e.g. one that already carries an auth cookie
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> AdoptResult<T> {
        tracing::debug!(endpoint, "catalog request");
        Self::exchange(request)
            .await
            .map_err(|e| AdoptError::Fetch(e.at(endpoint)))
    }

    async fn exchange<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, TransportError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DogApi for HttpDogApi {
    async fn breeds(&self) -> AdoptResult<Vec<String>> {
        self.send(BREEDS, self.client.get(self.url(BREEDS))).await
    }

    async fn search(&self, query: &CanonicalQuery) -> AdoptResult<SearchResult> {
        let request = self
            .client
            .get(self.url(SEARCH))
            .query(&query.to_query_pairs());
        self.send(SEARCH, request).await
    }

    async fn dogs(&self, ids: &[String]) -> AdoptResult<Vec<Dog>> {
        self.send(DOGS, self.client.post(self.url(DOGS)).json(ids))
            .await
    }

    async fn match_dogs(&self, ids: &[String]) -> AdoptResult<String> {
        let response: MatchResponse = self
            .send(MATCH, self.client.post(self.url(MATCH)).json(ids))
            .await?;
        Ok(response.matched)
    }

    async fn locations(&self, zip_codes: &[String]) -> AdoptResult<Vec<Location>> {
        self.send(
            LOCATIONS,
            self.client.post(self.url(LOCATIONS)).json(zip_codes),
        )
        .await
    }

    async fn search_locations(
        &self,
        request: &LocationSearchRequest,
    ) -> AdoptResult<LocationSearchResponse> {
        self.send(
            LOCATION_SEARCH,
            self.client.post(self.url(LOCATION_SEARCH)).json(request),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let api = HttpDogApi::with_client(Client::new(), "http://localhost:9000/");
        assert_eq!(api.base_url(), "http://localhost:9000");
        assert_eq!(api.url(SEARCH), "http://localhost:9000/dogs/search");
    }

    #[test]
    fn test_status_error_mapping() {
        let err = TransportError::Status {
            status: 503,
            body: "down".to_string(),
        }
        .at(SEARCH);
        assert_eq!(
            err,
            FetchError::Status {
                endpoint: SEARCH.to_string(),
                status: 503,
                message: "down".to_string(),
            }
        );
        assert!(err.is_transient());
    }

    #[test]
    fn test_json_error_maps_to_decode() {
        let json_err = serde_json::from_str::<Vec<String>>("{").unwrap_err();
        let err = TransportError::from(json_err).at(BREEDS);
        assert_eq!(err.error_code(), "FETCH_DECODE");
        assert_eq!(err.endpoint(), BREEDS);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is closed in test environments
        let api = HttpDogApi::with_client(Client::new(), "http://127.0.0.1:9");
        let err = api.breeds().await.unwrap_err();
        assert!(matches!(err, AdoptError::Fetch(FetchError::Transport { .. })));
        assert!(err.is_transient());
    }
}

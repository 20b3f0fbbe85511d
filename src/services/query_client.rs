//! HTTP client for the recommendation backend
//!
//! Issues `GET {api_url}/recommendations/{anime_name}?top_n={n}` and hands
//! back the body untouched. Every failure leaves here already classified.
use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client as HttpClient,
};
use serde_json::Value;
use tracing::Instrument;

use crate::{
    config::Config,
    error::{ClientResult, QueryError},
    middleware::{make_span_with_request_id, with_request_id, RequestId},
    models::{RawPayload, RecommendationQuery},
};

/// Source of raw recommendation payloads
///
/// The HTTP client is the production implementation; tests substitute mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Fetch the raw payload for an already validated query
    async fn fetch(&self, query: &RecommendationQuery) -> ClientResult<RawPayload>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}

#[derive(Clone)]
pub struct QueryClient {
    http_client: HttpClient,
    api_url: String,
    timeout: Duration,
}

impl QueryClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = HttpClient::builder()
            .user_agent(concat!("anime-recs/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Self::new(config.api_url.clone(), config.request_timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validates raw user input, then fetches. Invalid input never reaches the network.
    pub async fn fetch_raw(&self, anime_name: &str, top_n: u32) -> ClientResult<RawPayload> {
        let query = RecommendationQuery::new(anime_name, top_n)?;
        self.fetch(&query).await
    }

    /// Endpoint for a query, with the name escaped as a single path segment
    pub fn endpoint(&self, query: &RecommendationQuery) -> String {
        format!(
            "{}/recommendations/{}",
            self.api_url,
            urlencoding::encode(query.anime_name())
        )
    }
}

#[async_trait::async_trait]
impl RecommendationSource for QueryClient {
    async fn fetch(&self, query: &RecommendationQuery) -> ClientResult<RawPayload> {
        let request_id = RequestId::new();
        let span = make_span_with_request_id(query, &request_id);

        async move {
            let url = self.endpoint(query);
            tracing::debug!(url = %url, "Sending recommendation request");

            let request = self
                .http_client
                .get(&url)
                .query(&[("top_n", query.top_n())]);

            let response = with_request_id(request, &request_id)
                .send()
                .await
                .map_err(|e| {
                    let err = QueryError::from(e);
                    tracing::warn!(kind = %err.kind(), error = %err, "Recommendation request failed");
                    err
                })?;

            let status = response.status();

            if !status.is_success() {
                // The status alone decides the kind; an unreadable body only loses the detail
                let detail = response
                    .text()
                    .await
                    .ok()
                    .and_then(|body| serde_json::from_str::<Value>(&body).ok());
                let err = QueryError::classify(Some(status.as_u16()), detail.as_ref());
                tracing::warn!(
                    status = status.as_u16(),
                    kind = %err.kind(),
                    "Recommendation backend returned an error"
                );
                return Err(err);
            }

            let body = response.text().await?;

            let payload = serde_json::from_str::<Value>(&body).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Recommendation response is not JSON");
                Value::Null
            });

            tracing::info!(status = status.as_u16(), "Recommendation response received");

            Ok(RawPayload(payload))
        }
        .instrument(span)
        .await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

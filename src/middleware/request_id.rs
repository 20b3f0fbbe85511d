use reqwest::{header::HeaderValue, RequestBuilder};
use uuid::Uuid;

use crate::models::RecommendationQuery;

/// HTTP header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id attached to every outgoing recommendation request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Creates a new random request ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the UUID as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Adds the request ID header to an outgoing request.
///
/// A UUID always renders as a valid header value; the header is skipped
/// rather than failing the request if that ever stops holding.
pub fn with_request_id(builder: RequestBuilder, request_id: &RequestId) -> RequestBuilder {
    match HeaderValue::from_str(&request_id.as_str()) {
        Ok(value) => builder.header(REQUEST_ID_HEADER, value),
        Err(_) => builder,
    }
}

/// Span wrapping one recommendation request
pub fn make_span_with_request_id(
    query: &RecommendationQuery,
    request_id: &RequestId,
) -> tracing::Span {
    tracing::info_span!(
        "recommendation_request",
        anime = %query.anime_name(),
        top_n = query.top_n(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_header_is_attached() {
        let request_id = RequestId::new();
        let request = with_request_id(
            reqwest::Client::new().get("http://localhost/recommendations/x"),
            &request_id,
        )
        .build()
        .unwrap();

        let header = request.headers().get(REQUEST_ID_HEADER).unwrap();
        assert_eq!(header.to_str().unwrap(), request_id.as_str());
    }
}

use std::fmt;

use serde_json::Value;

const MSG_BAD_REQUEST: &str = "Invalid request. Check the submitted data.";
const MSG_NOT_FOUND: &str = "The requested anime was not found.";
const MSG_VALIDATION: &str = "Validation error in the submitted data.";
const MSG_SERVER: &str = "Internal server error. Please try again later.";
const MSG_NETWORK: &str = "Could not reach the server. Check your internet connection.";
const MSG_TIMEOUT: &str = "The request timed out. Please try again.";
const MSG_UNKNOWN: &str = "Unexpected error. Please try again.";

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Closed set of failure kinds a recommendation query can end with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Local validation failed before any network call
    InvalidParameter,
    BadRequest,
    NotFound,
    ValidationError,
    ServerError,
    /// The request was sent but no response came back
    NetworkError,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::ServerError => "server_error",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified query failure carrying a message fit for display
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct QueryError {
    kind: ErrorKind,
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl QueryError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParameter, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Maps the outcome of a network call onto an error kind and message.
    ///
    /// `status` is `None` when the request went out but no response arrived.
    /// `body` is the decoded JSON error body, if the server sent one.
    pub fn classify(status: Option<u16>, body: Option<&Value>) -> Self {
        let Some(status) = status else {
            return Self::new(ErrorKind::NetworkError, MSG_NETWORK);
        };

        match status {
            400 => Self::new(
                ErrorKind::BadRequest,
                detail_text(body)
                    .or_else(|| first_detail_msg(body))
                    .unwrap_or_else(|| MSG_BAD_REQUEST.to_string()),
            ),
            404 => Self::new(ErrorKind::NotFound, MSG_NOT_FOUND),
            422 => Self::new(
                ErrorKind::ValidationError,
                first_detail_msg(body)
                    .or_else(|| detail_text(body))
                    .unwrap_or_else(|| MSG_VALIDATION.to_string()),
            ),
            500..=599 => Self::new(ErrorKind::ServerError, MSG_SERVER),
            other => Self::new(
                ErrorKind::Unknown,
                detail_text(body).unwrap_or_else(|| format!("Server error ({})", other)),
            ),
        }
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        let classified = if err.is_timeout() {
            Self::new(ErrorKind::NetworkError, MSG_TIMEOUT)
        } else if err.is_connect() || err.is_request() || err.is_body() || err.is_decode() {
            Self::classify(None, None)
        } else if let Some(status) = err.status() {
            Self::classify(Some(status.as_u16()), None)
        } else {
            Self::new(ErrorKind::Unknown, MSG_UNKNOWN)
        };
        classified.with_cause(err)
    }
}

pub type ClientResult<T> = Result<T, QueryError>;

fn detail_text(body: Option<&Value>) -> Option<String> {
    body?
        .get("detail")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_detail_msg(body: Option<&Value>) -> Option<String> {
    body?
        .get("detail")?
        .as_array()?
        .first()?
        .get("msg")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

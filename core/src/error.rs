//! Error types for the management API client.
//!
//! # Design
//! Three kinds of failure reach a caller. `InvalidArgument` is raised while a
//! request is being built and never touches the network. `Transport` wraps
//! whatever the transport could not complete. Everything the server answered
//! with but we could not accept (`Api`, `RateLimited`, `Deserialization`) is
//! an API error and carries the HTTP status.
//!
//! Nothing here is retried. Recovery belongs to whoever owns the
//! [`crate::transport::HttpClient`].

use serde::Deserialize;

use crate::http::HttpResponse;

/// Boxed error produced by a [`crate::transport::Transport`].
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned while building or executing a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required argument was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The HTTP call could not complete.
    #[error("transport failure: {0}")]
    Transport(#[source] TransportError),

    /// The server returned a non-2xx status other than 429.
    #[error("request failed with status {status}: {}", describe(.payload.as_ref(), .body))]
    Api {
        status: u16,
        payload: Option<ErrorPayload>,
        body: String,
    },

    /// The server returned 429. Header values are `None` when absent.
    #[error("rate limit reached (limit {limit:?}, remaining {remaining:?}, reset {reset:?})")]
    RateLimited {
        limit: Option<i64>,
        remaining: Option<i64>,
        reset: Option<i64>,
        payload: Option<ErrorPayload>,
    },

    /// A 2xx body could not be decoded into the expected shape.
    #[error("failed to parse response with status {status}: {message}")]
    Deserialization { status: u16, message: String },

    /// The request body could not be encoded as JSON.
    #[error("failed to serialize request body: {0}")]
    Serialization(String),
}

impl ApiError {
    pub(crate) fn invalid_argument(name: &str) -> Self {
        ApiError::InvalidArgument(format!("{name} cannot be empty"))
    }

    /// HTTP status of an error the server answered with.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } | ApiError::Deserialization { status, .. } => Some(*status),
            ApiError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Structured error body, when the server sent one.
    pub fn payload(&self) -> Option<&ErrorPayload> {
        match self {
            ApiError::Api { payload, .. } | ApiError::RateLimited { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    /// Map a non-success response onto the matching variant.
    pub(crate) fn from_response(response: &HttpResponse) -> Self {
        let payload = ErrorPayload::parse(&response.body);
        if response.status == 429 {
            let header = |name: &str| response.header(name).and_then(|v| v.trim().parse().ok());
            return ApiError::RateLimited {
                limit: header("x-ratelimit-limit"),
                remaining: header("x-ratelimit-remaining"),
                reset: header("x-ratelimit-reset"),
                payload,
            };
        }
        ApiError::Api {
            status: response.status,
            payload,
            body: response.body.clone(),
        }
    }
}

/// Error body returned by the management API.
///
/// The management endpoints answer with `{statusCode, error, message, errorCode}`
/// while the authentication endpoints use `{error, error_description}`; both
/// land in the same fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorPayload {
    #[serde(rename = "statusCode")]
    pub status_code: Option<u16>,
    /// Short reason phrase, e.g. `Bad Request`.
    pub error: Option<String>,
    #[serde(rename = "errorCode", alias = "code")]
    pub code: Option<String>,
    #[serde(alias = "error_description", alias = "description")]
    pub message: Option<String>,
}

impl ErrorPayload {
    fn parse(body: &str) -> Option<Self> {
        let payload: ErrorPayload = serde_json::from_str(body).ok()?;
        if payload == ErrorPayload::default() {
            return None;
        }
        Some(payload)
    }

    /// Machine-readable code, falling back to the reason phrase.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().or(self.error.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

fn describe(payload: Option<&ErrorPayload>, body: &str) -> String {
    match payload {
        Some(p) => format!(
            "{} ({})",
            p.description().unwrap_or("no description"),
            p.code().unwrap_or("no code")
        ),
        None => body.to_string(),
    }
}

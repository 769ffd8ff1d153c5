//! Typed, not-yet-executed HTTP calls.
//!
//! # Design
//! A `Request<T>` is an [`HttpRequest`] plus the shared client it will be sent
//! through and a shape descriptor: a plain function that turns a successful
//! [`HttpResponse`] into `T`. Building one performs no I/O; `execute()`
//! consumes it and performs exactly one exchange.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::HttpClient;

type ParseFn<T> = fn(&HttpResponse) -> Result<T, ApiError>;

/// An HTTP call that yields `T` when executed.
///
/// Not meant to be shared between threads while headers or body are still
/// being set; build it, then execute it once.
pub struct Request<T> {
    client: HttpClient,
    http: HttpRequest,
    parse: ParseFn<T>,
}

impl<T: DeserializeOwned> Request<T> {
    /// Request whose successful body is decoded as JSON into `T`.
    pub fn json(client: HttpClient, url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            client,
            http: HttpRequest::new(method, url),
            parse: parse_json::<T>,
        }
    }
}

impl Request<()> {
    /// Request whose response payload, if any, is ignored.
    pub fn void(client: HttpClient, url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            client,
            http: HttpRequest::new(method, url),
            parse: parse_empty,
        }
    }
}

impl<T> Request<T> {
    pub fn add_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.http.set_header(name, value);
        self
    }

    /// Attach `body` as JSON and set the matching content type.
    pub fn set_body<B: Serialize + ?Sized>(&mut self, body: &B) -> Result<&mut Self, ApiError> {
        let encoded =
            serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.http.set_header("Content-Type", "application/json");
        self.http.body = Some(encoded);
        Ok(self)
    }

    pub fn method(&self) -> HttpMethod {
        self.http.method
    }

    pub fn url(&self) -> &str {
        &self.http.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.http.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.http.header(name)
    }

    pub fn body(&self) -> Option<&str> {
        self.http.body.as_deref()
    }

    /// The request exactly as it will be handed to the interceptor chain.
    pub fn as_http(&self) -> &HttpRequest {
        &self.http
    }

    /// Send the request and decode the response.
    pub fn execute(self) -> Result<T, ApiError> {
        let Request {
            client,
            http,
            parse,
        } = self;
        let method = http.method;
        let url = http.url.clone();
        debug!(%method, %url, "executing request");

        let response = client.send(http)?;
        if !response.is_success() {
            warn!(%method, %url, status = response.status, "request failed");
            return Err(ApiError::from_response(&response));
        }
        parse(&response)
    }
}

impl<T> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Headers are left out: they carry the bearer token.
        f.debug_struct("Request")
            .field("method", &self.http.method)
            .field("url", &self.http.url)
            .field("has_body", &self.http.body.is_some())
            .finish_non_exhaustive()
    }
}

fn parse_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization {
        status: response.status,
        message: e.to_string(),
    })
}

fn parse_empty(_response: &HttpResponse) -> Result<(), ApiError> {
    Ok(())
}

//! The shared client handle every entity sends through.
//!
//! # Design
//! `HttpClient` pairs one [`Transport`] with an ordered chain of
//! [`Interceptor`]s. Entities hold a clone of the handle, never a transport
//! of their own, so a caller who installs an interceptor (token refresh,
//! rate-limit bookkeeping) affects every request issued by every entity
//! built on that handle.
//!
//! Non-2xx statuses come back from a transport as data. Only failures to
//! complete the exchange are errors at this layer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{ApiError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes a single HTTP exchange.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Hook run around every exchange, in registration order.
pub trait Interceptor: Send + Sync {
    /// Inspect or rewrite the request before it is sent. An error aborts the
    /// exchange and is returned from `execute()` unchanged.
    fn before_send(&self, request: &mut HttpRequest) -> Result<(), ApiError>;

    fn after_receive(&self, _request: &HttpRequest, _response: &HttpResponse) {}
}

/// Blocking transport backed by a `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Transport whose exchanges are bounded by `timeout` end to end.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Self {
        // 4xx/5xx must reach the caller as data, not as ureq errors.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let headers = &request.headers;
        let body = request.body.as_deref().map(str::as_bytes);

        let result = match (request.method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(self.agent.post(url), headers).send(body),
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(self.agent.put(url), headers).send(body),
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), headers).send_empty(),
            (HttpMethod::Patch, Some(body)) => with_headers(self.agent.patch(url), headers).send(body),
            (HttpMethod::Patch, None) => with_headers(self.agent.patch(url), headers).send_empty(),
        };
        let mut response = result?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

struct Inner {
    transport: Box<dyn Transport>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

/// Cheap-to-clone handle shared by every entity of a facade.
///
/// Safe for concurrent use: the transport and interceptors are only ever
/// borrowed immutably.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Inner>,
}

impl HttpClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport: Box::new(transport),
                interceptors: Vec::new(),
            }),
        }
    }

    /// Default client over [`UreqTransport`] with the given timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(UreqTransport::with_timeout(timeout))
    }

    /// Return a handle with `interceptor` appended to the chain.
    ///
    /// Clones made before this call keep their own chain.
    pub fn with_interceptor(self, interceptor: impl Interceptor + 'static) -> Self {
        let inner = match Arc::try_unwrap(self.inner) {
            Ok(mut inner) => {
                inner.interceptors.push(Arc::new(interceptor));
                inner
            }
            Err(shared) => {
                // The transport cannot be cloned; share it through a forwarding wrapper.
                let mut interceptors = shared.interceptors.clone();
                interceptors.push(Arc::new(interceptor));
                Inner {
                    transport: Box::new(Shared(Arc::clone(&shared))),
                    interceptors,
                }
            }
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn interceptor_count(&self) -> usize {
        self.inner.interceptors.len()
    }

    /// Run the interceptor chain, then perform exactly one exchange.
    pub fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        for interceptor in &self.inner.interceptors {
            interceptor.before_send(&mut request)?;
        }
        trace!(method = %request.method, url = %request.url, "dispatching to transport");
        let response = self
            .inner
            .transport
            .send(&request)
            .map_err(ApiError::Transport)?;
        debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "received response"
        );
        for interceptor in &self.inner.interceptors {
            interceptor.after_receive(&request, &response);
        }
        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(UreqTransport::new())
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("interceptors", &self.inner.interceptors.len())
            .finish_non_exhaustive()
    }
}

/// Sends through another handle's transport, bypassing its interceptors.
struct Shared(Arc<Inner>);

impl Transport for Shared {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.0.transport.send(request)
    }
}

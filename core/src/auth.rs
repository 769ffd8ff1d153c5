//! Credential providers consulted at send time.
//!
//! Entities stamp the token they were built with onto every request. When a
//! [`BearerAuth`] interceptor is installed on the shared [`crate::HttpClient`],
//! it overwrites that header with whatever its provider currently returns, so
//! entities built with a placeholder token stay valid across rotations.

use std::fmt;

use tracing::trace;

use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::transport::Interceptor;

pub const AUTHORIZATION: &str = "Authorization";

/// Value of the `Authorization` header for `token`.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Source of the current access token.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Result<String, ApiError>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Result<String, ApiError> + Send + Sync,
{
    fn token(&self) -> Result<String, ApiError> {
        self()
    }
}

/// A fixed token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Result<String, ApiError> {
        Ok(self.0.clone())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticToken").field(&"[REDACTED]").finish()
    }
}

/// Interceptor that sets `Authorization: Bearer <token>` from a provider.
pub struct BearerAuth<P> {
    provider: P,
}

impl<P: TokenProvider> BearerAuth<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: TokenProvider> Interceptor for BearerAuth<P> {
    fn before_send(&self, request: &mut HttpRequest) -> Result<(), ApiError> {
        let token = self.provider.token()?;
        if token.is_empty() {
            return Err(ApiError::invalid_argument("api token"));
        }
        trace!(url = %request.url, "injecting bearer token");
        request.set_header(AUTHORIZATION, bearer(&token));
        Ok(())
    }
}

impl<P> fmt::Debug for BearerAuth<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn overwrites_placeholder_header() {
        let auth = BearerAuth::new(StaticToken::new("fresh"));
        let mut req = HttpRequest::new(HttpMethod::Get, "https://tenant.example.com/api/v2/rules");
        req.set_header(AUTHORIZATION, bearer("placeholder"));
        auth.before_send(&mut req).unwrap();
        assert_eq!(req.header("authorization"), Some("Bearer fresh"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn closure_provider_is_consulted_per_request() {
        let calls = AtomicUsize::new(0);
        let auth = BearerAuth::new(move || -> Result<String, ApiError> {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("token-{n}"))
        });
        let mut first = HttpRequest::new(HttpMethod::Get, "https://a/");
        let mut second = HttpRequest::new(HttpMethod::Get, "https://a/");
        auth.before_send(&mut first).unwrap();
        auth.before_send(&mut second).unwrap();
        assert_eq!(first.header(AUTHORIZATION), Some("Bearer token-0"));
        assert_eq!(second.header(AUTHORIZATION), Some("Bearer token-1"));
    }

    #[test]
    fn empty_token_is_rejected() {
        let auth = BearerAuth::new(StaticToken::new(""));
        let mut req = HttpRequest::new(HttpMethod::Get, "https://a/");
        let err = auth.before_send(&mut req).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn static_token_debug_is_redacted() {
        let rendered = format!("{:?}", StaticToken::new("secret-value"));
        assert!(!rendered.contains("secret-value"));
    }
}

//! Entry point aggregating every entity behind one handle.
//!
//! # Design
//! All entities share one [`HttpClient`] and one base URL. The client and
//! base URL stay reachable after construction, so a wrapping layer can
//! install interceptors (token refresh, rate-limit tracking) or rebuild
//! entities with another token via [`ManagementApi::with_api_token`].

use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::entities::{RulesEntity, StatsEntity, UsersEntity};
use crate::entity::BaseEntity;
use crate::error::ApiError;
use crate::transport::HttpClient;

/// Handle to a tenant's management API.
#[derive(Debug, Clone)]
pub struct ManagementApi {
    client: HttpClient,
    base_url: Url,
    rules: RulesEntity,
    stats: StatsEntity,
    users: UsersEntity,
}

impl ManagementApi {
    /// Facade over the default blocking transport.
    pub fn new(domain: &str, api_token: &str) -> Result<Self, ApiError> {
        Self::with_client(domain, api_token, HttpClient::default())
    }

    /// Facade over a caller-owned client.
    ///
    /// When the client carries a [`crate::auth::BearerAuth`] interceptor,
    /// `api_token` may be any non-empty placeholder; the interceptor replaces
    /// it on every request.
    pub fn with_client(domain: &str, api_token: &str, client: HttpClient) -> Result<Self, ApiError> {
        if api_token.trim().is_empty() {
            return Err(ApiError::invalid_argument("api token"));
        }
        let base_url = create_base_url(domain)?;
        info!(base_url = %base_url, "management api configured");
        Ok(Self::assemble(client, base_url, api_token))
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let client = match config.timeout() {
            Some(timeout) => HttpClient::with_timeout(timeout),
            None => HttpClient::default(),
        };
        Self::with_client(&config.domain, &config.api_token, client)
    }

    fn assemble(client: HttpClient, base_url: Url, api_token: &str) -> Self {
        let base = BaseEntity::new(client.clone(), base_url.clone(), api_token);
        Self {
            rules: RulesEntity::new(base.clone()),
            stats: StatsEntity::new(base.clone()),
            users: UsersEntity::new(base),
            client,
            base_url,
        }
    }

    /// Same client and base URL, every entity rebuilt around `api_token`.
    pub fn with_api_token(&self, api_token: &str) -> Result<Self, ApiError> {
        if api_token.trim().is_empty() {
            return Err(ApiError::invalid_argument("api token"));
        }
        debug!(base_url = %self.base_url, "rebuilding entities with a new token");
        Ok(Self::assemble(self.client.clone(), self.base_url.clone(), api_token))
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn rules(&self) -> &RulesEntity {
        &self.rules
    }

    pub fn stats(&self) -> &StatsEntity {
        &self.stats
    }

    pub fn users(&self) -> &UsersEntity {
        &self.users
    }
}

/// Normalize a tenant domain into an http(s) base URL ending in `/`.
///
/// A bare host such as `tenant.example.com` is served over https.
pub fn create_base_url(domain: &str) -> Result<Url, ApiError> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(ApiError::invalid_argument("domain"));
    }
    let candidate = if domain.contains("://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    };
    let mut url = Url::parse(&candidate)
        .map_err(|e| ApiError::InvalidArgument(format!("invalid domain {domain:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ApiError::InvalidArgument(format!(
            "invalid domain {domain:?}: expected an http(s) URL"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

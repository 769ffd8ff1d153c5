//! State and URL helpers shared by every resource entity.

use std::fmt;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::{bearer, AUTHORIZATION};
use crate::error::ApiError;
use crate::filter::Filter;
use crate::http::HttpMethod;
use crate::request::Request;
use crate::transport::HttpClient;

/// Client handle, base URL and the token captured at construction.
///
/// The token never changes for the lifetime of the entity. Rotate tokens with
/// a [`crate::auth::BearerAuth`] interceptor on the client instead.
#[derive(Clone)]
pub struct BaseEntity {
    client: HttpClient,
    base_url: Url,
    api_token: String,
}

impl BaseEntity {
    pub fn new(client: HttpClient, base_url: Url, api_token: impl Into<String>) -> Self {
        Self {
            client,
            base_url,
            api_token: api_token.into(),
        }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Base URL with `segments` appended, each percent-encoded as one segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        let mut path = url.path().trim_end_matches('/').to_string();
        for segment in segments {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
        }
        url.set_path(&path);
        url
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, url: Url) -> Request<T> {
        self.authorized(Request::json(self.client.clone(), url, HttpMethod::Get))
    }

    pub(crate) fn post<T: DeserializeOwned>(&self, url: Url) -> Request<T> {
        self.authorized(Request::json(self.client.clone(), url, HttpMethod::Post))
    }

    pub(crate) fn patch<T: DeserializeOwned>(&self, url: Url) -> Request<T> {
        self.authorized(Request::json(self.client.clone(), url, HttpMethod::Patch))
    }

    pub(crate) fn delete(&self, url: Url) -> Request<()> {
        self.authorized(Request::void(self.client.clone(), url, HttpMethod::Delete))
    }

    fn authorized<T>(&self, mut request: Request<T>) -> Request<T> {
        request.add_header(AUTHORIZATION, bearer(&self.api_token));
        request
    }
}

impl fmt::Debug for BaseEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseEntity")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

/// Append `pairs` to the query string of `url`.
pub(crate) fn append_query<'a>(url: &mut Url, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) {
    let mut pairs = pairs.into_iter().peekable();
    // Opening the serializer on an empty set would leave a dangling `?`.
    if pairs.peek().is_none() {
        return;
    }
    url.query_pairs_mut().extend_pairs(pairs);
}

/// Append every parameter of `filter`, if any.
pub(crate) fn append_filter<F: Filter>(url: &mut Url, filter: Option<&F>) {
    if let Some(filter) = filter {
        append_query(
            url,
            filter
                .params()
                .pairs()
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
    }
}

/// Fail with `InvalidArgument` when a required string is empty.
pub(crate) fn require<'a>(value: &'a str, name: &str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid_argument(name));
    }
    Ok(value)
}

/// Calendar date as `YYYYMMDD`.
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

//! Blocking client for a tenant's identity management API.
//!
//! # Overview
//! [`ManagementApi`] groups one entity per resource (rules, stats, users).
//! Entity methods build a typed [`Request`] without touching the network;
//! [`Request::execute`] performs the single HTTP exchange and decodes the
//! result.
//!
//! # Design
//! - Requests are plain data ([`HttpRequest`]) until executed, so every URL,
//!   header and body can be asserted on directly.
//! - All entities send through one shared [`HttpClient`]: a [`Transport`]
//!   plus an [`Interceptor`] chain. Token refresh and rate limiting are
//!   installed there by the caller, never inside an entity.
//! - Errors are never retried here; see [`ApiError`].

pub mod api;
pub mod auth;
pub mod config;
pub mod entities;
pub mod entity;
pub mod error;
pub mod filter;
pub mod http;
pub mod request;
pub mod transport;
pub mod types;

pub use api::ManagementApi;
pub use auth::{BearerAuth, StaticToken, TokenProvider};
pub use config::{Config, ConfigError};
pub use entities::{RulesEntity, StatsEntity, UsersEntity};
pub use entity::BaseEntity;
pub use error::{ApiError, ErrorPayload, TransportError};
pub use filter::{FieldsFilter, Filter, QueryParams, RulesFilter, UserFilter};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::Request;
pub use transport::{HttpClient, Interceptor, Transport, UreqTransport};
pub use types::{DailyStats, Page, Rule, RulesPage, User, UsersPage};

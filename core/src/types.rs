//! Resource payloads exchanged with the management API.
//!
//! # Design
//! Every field is optional so the same struct serves as create payload,
//! partial update and response. Unset fields are left out of request bodies.
//! Server-assigned fields (`id`, `stage`) are never sent back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A rule: a JavaScript snippet run during authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, skip_serializing)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing)]
    pub stage: Option<String>,
}

impl Rule {
    pub fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            script: Some(script.into()),
            ..Self::default()
        }
    }
}

/// Login and signup counters for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub logins: Option<i64>,
    #[serde(default)]
    pub signups: Option<i64>,
    #[serde(default)]
    pub leaked_passwords: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A user of the tenant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing)]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Write-only.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing)]
    pub identities: Option<Vec<Value>>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub logins_count: Option<i64>,
}

/// One page of a list endpoint.
///
/// The API answers with an envelope when `include_totals=true` and with a
/// bare array otherwise; both decode into a `Page`, with the counters left
/// empty for the bare form.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub start: Option<i64>,
    pub length: Option<i64>,
    pub total: Option<i64>,
    pub limit: Option<i64>,
    pub items: Vec<T>,
}

pub type RulesPage = Page<Rule>;
pub type UsersPage = Page<User>;

impl<T> Page<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Envelope {
        #[serde(default)]
        start: Option<i64>,
        #[serde(default)]
        length: Option<i64>,
        #[serde(default)]
        total: Option<i64>,
        #[serde(default)]
        limit: Option<i64>,
        #[serde(alias = "rules", alias = "users")]
        items: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PageRepr::deserialize(deserializer)? {
            PageRepr::Envelope {
                start,
                length,
                total,
                limit,
                items,
            } => Page {
                start,
                length,
                total,
                limit,
                items,
            },
            PageRepr::Bare(items) => Page {
                start: None,
                length: None,
                total: None,
                limit: None,
                items,
            },
        })
    }
}

use tracing::debug;

use super::API_V2;
use crate::entity::{append_filter, append_query, require, BaseEntity};
use crate::error::ApiError;
use crate::filter::{Filter, RulesFilter};
use crate::request::Request;
use crate::types::{Rule, RulesPage};

/// Parameter dropped by [`RulesEntity::list`]: the totals envelope cannot be
/// decoded as the plain array that method promises.
pub const LEGACY_LIST_EXCLUDED_PARAM: &str = "include_totals";

/// Operations on `api/v2/rules`.
#[derive(Debug, Clone)]
pub struct RulesEntity {
    base: BaseEntity,
}

impl RulesEntity {
    pub fn new(base: BaseEntity) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn url(&self, id: Option<&str>) -> url::Url {
        let mut segments = API_V2.to_vec();
        segments.push("rules");
        segments.extend(id);
        self.base.endpoint(&segments)
    }

    /// `GET api/v2/rules` with every filter parameter, paginated or not.
    pub fn list_all(&self, filter: Option<&RulesFilter>) -> Request<RulesPage> {
        let mut url = self.url(None);
        append_filter(&mut url, filter);
        self.base.get(url)
    }

    /// `GET api/v2/rules` decoded as a plain array.
    ///
    /// Drops [`LEGACY_LIST_EXCLUDED_PARAM`] from `filter`, whatever its case,
    /// so the response stays an array.
    #[deprecated(note = "will be limited to the first page upstream; use `list_all`")]
    pub fn list(&self, filter: Option<&RulesFilter>) -> Request<Vec<Rule>> {
        let mut url = self.url(None);
        if let Some(filter) = filter {
            let kept = filter
                .params()
                .pairs()
                .iter()
                .filter(|(name, _)| !name.eq_ignore_ascii_case(LEGACY_LIST_EXCLUDED_PARAM))
                .map(|(k, v)| (k.as_str(), v.as_str()));
            append_query(&mut url, kept);
        }
        self.base.get(url)
    }

    /// `GET api/v2/rules/{id}`.
    pub fn get(&self, rule_id: &str, filter: Option<&RulesFilter>) -> Result<Request<Rule>, ApiError> {
        let rule_id = require(rule_id, "rule id")?;
        let mut url = self.url(Some(rule_id));
        append_filter(&mut url, filter);
        Ok(self.base.get(url))
    }

    /// `POST api/v2/rules`.
    pub fn create(&self, rule: &Rule) -> Result<Request<Rule>, ApiError> {
        let mut request = self.base.post(self.url(None));
        request.set_body(rule)?;
        debug!(name = ?rule.name, "prepared rule creation");
        Ok(request)
    }

    /// `PATCH api/v2/rules/{id}`. `rule.id` is never sent.
    pub fn update(&self, rule_id: &str, rule: &Rule) -> Result<Request<Rule>, ApiError> {
        let rule_id = require(rule_id, "rule id")?;
        let mut request = self.base.patch(self.url(Some(rule_id)));
        request.set_body(rule)?;
        Ok(request)
    }

    /// `DELETE api/v2/rules/{id}`.
    pub fn delete(&self, rule_id: &str) -> Result<Request<()>, ApiError> {
        let rule_id = require(rule_id, "rule id")?;
        Ok(self.base.delete(self.url(Some(rule_id))))
    }
}

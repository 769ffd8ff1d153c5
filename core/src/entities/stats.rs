use chrono::NaiveDate;

use super::API_V2;
use crate::entity::{append_query, format_date, BaseEntity};
use crate::request::Request;
use crate::types::DailyStats;

/// Operations on `api/v2/stats`.
#[derive(Debug, Clone)]
pub struct StatsEntity {
    base: BaseEntity,
}

impl StatsEntity {
    pub fn new(base: BaseEntity) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn url(&self, leaf: &str) -> url::Url {
        let [api, version] = API_V2;
        self.base.endpoint(&[api, version, "stats", leaf])
    }

    /// Users who logged in during the last 30 days.
    pub fn get_active_users_count(&self) -> Request<i64> {
        self.base.get(self.url("active-users"))
    }

    /// Daily counters between `from` and `to`, both inclusive.
    pub fn get_daily_stats(&self, from: NaiveDate, to: NaiveDate) -> Request<Vec<DailyStats>> {
        let mut url = self.url("daily");
        let (from, to) = (format_date(from), format_date(to));
        append_query(&mut url, [("from", from.as_str()), ("to", to.as_str())]);
        self.base.get(url)
    }
}

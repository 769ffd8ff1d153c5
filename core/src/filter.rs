//! Optional query parameters, collected through chained setters.
//!
//! Filters are plain builders and are not synchronized; build one per call
//! site or guard it yourself.

use std::collections::HashMap;

/// Ordered query parameters. Setting a name twice keeps the first position
/// and the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.pairs.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parameters in insertion order, as they will appear in the query string.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Parameters as an unordered map.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.pairs.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Anything that contributes query parameters to an entity call.
pub trait Filter {
    fn params(&self) -> &QueryParams;
}

impl Filter for QueryParams {
    fn params(&self) -> &QueryParams {
        self
    }
}

macro_rules! filter_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            params: QueryParams,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// Set an arbitrary parameter not covered by a dedicated setter.
            pub fn with_param(mut self, name: &str, value: impl ToString) -> Self {
                self.params.set(name, value);
                self
            }
        }

        impl Filter for $name {
            fn params(&self) -> &QueryParams {
                &self.params
            }
        }
    };
}

filter_type!(
    /// Field selection only.
    FieldsFilter
);

filter_type!(
    /// Parameters accepted by the rules endpoints.
    RulesFilter
);

filter_type!(
    /// Parameters accepted by the users endpoints.
    UserFilter
);

impl FieldsFilter {
    /// Comma-separated `fields`, included or excluded from the response.
    pub fn with_fields(mut self, fields: &str, include_fields: bool) -> Self {
        self.params.set("fields", fields);
        self.params.set("include_fields", include_fields);
        self
    }
}

impl RulesFilter {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.params.set("enabled", enabled);
        self
    }

    pub fn with_fields(mut self, fields: &str, include_fields: bool) -> Self {
        self.params.set("fields", fields);
        self.params.set("include_fields", include_fields);
        self
    }

    /// Zero-based page index and page size.
    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.params.set("page", page);
        self.params.set("per_page", per_page);
        self
    }

    /// Ask for the paginated envelope with a `total` count.
    pub fn with_totals(mut self, include_totals: bool) -> Self {
        self.params.set("include_totals", include_totals);
        self
    }
}

impl UserFilter {
    /// Lucene-style search query, evaluated by the v3 search engine.
    pub fn with_query(mut self, query: &str) -> Self {
        self.params.set("q", query);
        self.params.set("search_engine", "v3");
        self
    }

    /// Sort expression, e.g. `created_at:1`.
    pub fn with_sort(mut self, sort: &str) -> Self {
        self.params.set("sort", sort);
        self
    }

    pub fn with_fields(mut self, fields: &str, include_fields: bool) -> Self {
        self.params.set("fields", fields);
        self.params.set("include_fields", include_fields);
        self
    }

    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.params.set("page", page);
        self.params.set("per_page", per_page);
        self
    }

    pub fn with_totals(mut self, include_totals: bool) -> Self {
        self.params.set("include_totals", include_totals);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_back_ignores_insertion_order() {
        let mut forward = QueryParams::new();
        forward.set("a", "1");
        forward.set("b", "2");
        let mut backward = QueryParams::new();
        backward.set("b", "2");
        backward.set("a", "1");

        let expected: HashMap<String, String> = [("a", "1"), ("b", "2")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(forward.to_map(), expected);
        assert_eq!(backward.to_map(), expected);
        assert_ne!(forward.pairs(), backward.pairs());
    }

    #[test]
    fn last_write_wins_in_first_position() {
        let filter = RulesFilter::new()
            .with_page(0, 10)
            .with_enabled(true)
            .with_page(2, 50);
        let pairs = filter.params().pairs();
        assert_eq!(pairs[0], ("page".to_string(), "2".to_string()));
        assert_eq!(pairs[1], ("per_page".to_string(), "50".to_string()));
        assert_eq!(pairs[2], ("enabled".to_string(), "true".to_string()));
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn rules_filter_setters() {
        let filter = RulesFilter::new()
            .with_fields("id,name", false)
            .with_totals(true);
        let params = filter.params();
        assert_eq!(params.get("fields"), Some("id,name"));
        assert_eq!(params.get("include_fields"), Some("false"));
        assert_eq!(params.get("include_totals"), Some("true"));
    }

    #[test]
    fn user_query_selects_v3_engine() {
        let filter = UserFilter::new()
            .with_query("email:\"jane@example.com\"")
            .with_sort("created_at:1");
        assert_eq!(filter.params().get("search_engine"), Some("v3"));
        assert_eq!(filter.params().get("q"), Some("email:\"jane@example.com\""));
        assert_eq!(filter.params().get("sort"), Some("created_at:1"));
    }

    #[test]
    fn custom_parameter_passes_through() {
        let filter = FieldsFilter::new().with_param("connection", "db");
        assert_eq!(filter.params().get("connection"), Some("db"));
    }
}

//! Filter state owned by a list view.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;
use thiserror::Error;

/// Page size used when a view does not configure one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Errors raised when a list query would break its invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListQueryError {
    #[error("page size must be greater than zero")]
    ZeroPageSize,
    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),
}

/// Selection for a single categorical filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Wildcard matching every row.
    #[default]
    All,
    Exact(String),
}

impl FilterValue {
    /// Parses user input, treating blanks and `all` (any case) as the wildcard.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            FilterValue::All
        } else {
            FilterValue::Exact(value.to_string())
        }
    }

    pub fn as_exact(&self) -> Option<&str> {
        match self {
            FilterValue::All => None,
            FilterValue::Exact(value) => Some(value),
        }
    }
}

impl Display for FilterValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::All => f.write_str("all"),
            FilterValue::Exact(value) => f.write_str(value),
        }
    }
}

/// Ordering applied by the client-side refiner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Keep the order rows were fetched in.
    #[default]
    Original,
    /// Newest first.
    Recent,
    /// Highest engagement count first.
    Popular,
    /// Trending rows first, newest first within each group.
    Trending,
}

impl SortKey {
    pub fn parse(value: &str) -> Result<Self, ListQueryError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "original" => Ok(SortKey::Original),
            "recent" => Ok(SortKey::Recent),
            "popular" => Ok(SortKey::Popular),
            "trending" => Ok(SortKey::Trending),
            other => Err(ListQueryError::UnknownSortKey(other.to_string())),
        }
    }
}

/// Search term, filters, ordering and position of a list view.
///
/// `page` is 1-based and never below one; `page_size` is always positive.
/// Changing the search term, a filter or the sort key moves the view back
/// to the first page so it cannot be stranded past the end of a smaller
/// result set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    search_term: String,
    filters: BTreeMap<String, FilterValue>,
    sort_key: SortKey,
    page: usize,
    page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            filters: BTreeMap::new(),
            sort_key: SortKey::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    pub fn new(page_size: usize) -> Result<Self, ListQueryError> {
        if page_size == 0 {
            return Err(ListQueryError::ZeroPageSize);
        }
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Returns the selection for `key`, `All` when the filter was never set.
    pub fn filter(&self, key: &str) -> &FilterValue {
        static ALL: FilterValue = FilterValue::All;
        self.filters.get(key).unwrap_or(&ALL)
    }

    /// Iterates over the filters that narrow the result set.
    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters
            .iter()
            .filter_map(|(key, value)| value.as_exact().map(|exact| (key.as_str(), exact)))
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Zero-based page index in the backend's convention.
    pub fn backend_page_index(&self) -> usize {
        self.page - 1
    }

    /// Updates the search term. Returns `true` when the query changed.
    pub fn set_search_term(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if self.search_term == term {
            return false;
        }
        self.search_term = term;
        self.page = 1;
        true
    }

    /// Updates a categorical filter. Returns `true` when the query changed.
    pub fn set_filter(&mut self, key: impl Into<String>, value: FilterValue) -> bool {
        let key = key.into();
        if self.filter(&key) == &value {
            return false;
        }
        match value {
            FilterValue::All => {
                self.filters.remove(&key);
            }
            exact => {
                self.filters.insert(key, exact);
            }
        }
        self.page = 1;
        true
    }

    /// Updates the ordering. Returns `true` when the query changed.
    pub fn set_sort_key(&mut self, sort_key: SortKey) -> bool {
        if self.sort_key == sort_key {
            return false;
        }
        self.sort_key = sort_key;
        self.page = 1;
        true
    }

    /// Moves to `page`, clamping zero to the first page.
    pub fn set_page(&mut self, page: usize) -> bool {
        let page = page.max(1);
        if self.page == page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<bool, ListQueryError> {
        if page_size == 0 {
            return Err(ListQueryError::ZeroPageSize);
        }
        if self.page_size == page_size {
            return Ok(false);
        }
        self.page_size = page_size;
        self.page = 1;
        Ok(true)
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.set_search_term(term);
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.set_filter(key, value);
        self
    }

    pub fn with_sort_key(mut self, sort_key: SortKey) -> Self {
        self.set_sort_key(sort_key);
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.set_page(page);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_start_on_first_page_without_filters() {
        let query = ListQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.backend_page_index(), 0);
        assert_eq!(query.filter("role"), &FilterValue::All);
        assert_eq!(query.active_filters().count(), 0);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert_eq!(ListQuery::new(0), Err(ListQueryError::ZeroPageSize));
        let mut query = ListQuery::default();
        assert_eq!(query.set_page_size(0), Err(ListQueryError::ZeroPageSize));
    }

    #[test]
    fn changing_criteria_resets_page() {
        let mut query = ListQuery::default().with_page(4);
        assert!(query.set_search_term("john"));
        assert_eq!(query.page(), 1);

        query.set_page(3);
        assert!(query.set_filter("role", FilterValue::parse("Member")));
        assert_eq!(query.page(), 1);

        query.set_page(5);
        assert!(query.set_sort_key(SortKey::Recent));
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn unchanged_values_keep_page() {
        let mut query = ListQuery::default()
            .with_search_term("john")
            .with_filter("role", FilterValue::parse("Member"))
            .with_page(3);

        assert!(!query.set_search_term("john"));
        assert!(!query.set_filter("role", FilterValue::parse("Member")));
        assert!(!query.set_filter("status", FilterValue::parse("all")));
        assert!(!query.set_sort_key(SortKey::Original));
        assert_eq!(query.page(), 3);
    }

    #[test]
    fn page_zero_clamps_to_first_page() {
        let mut query = ListQuery::default().with_page(2);
        assert!(query.set_page(0));
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn filter_value_parsing() {
        assert_eq!(FilterValue::parse(" ALL "), FilterValue::All);
        assert_eq!(FilterValue::parse(""), FilterValue::All);
        assert_eq!(
            FilterValue::parse(" Member "),
            FilterValue::Exact("Member".to_string())
        );
    }

    #[test]
    fn sort_key_parsing() {
        assert_eq!(SortKey::parse("Recent"), Ok(SortKey::Recent));
        assert_eq!(SortKey::parse(""), Ok(SortKey::Original));
        assert_eq!(
            SortKey::parse("oldest"),
            Err(ListQueryError::UnknownSortKey("oldest".to_string()))
        );
    }
}

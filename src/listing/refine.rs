//! Client-side search, filtering and ordering over fully fetched rows.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::listing::pagination::Page;
use crate::listing::query::{ListQuery, SortKey};

/// Rows that can be searched, filtered and ordered locally.
pub trait Refinable {
    /// Text fields matched by the free-text search.
    fn search_fields(&self) -> Vec<&str>;

    /// Label of the categorical field named `key`, if the row has one.
    fn category(&self, key: &str) -> Option<&str>;

    /// Timestamp used by [`SortKey::Recent`].
    fn timestamp(&self) -> NaiveDateTime;

    /// Engagement count used by [`SortKey::Popular`].
    fn popularity(&self) -> u64 {
        0
    }

    /// Priority flag used by [`SortKey::Trending`].
    fn is_trending(&self) -> bool {
        false
    }
}

fn matches_search<T: Refinable>(row: &T, needle: &str) -> bool {
    row.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

fn matches_filters<T: Refinable>(row: &T, query: &ListQuery) -> bool {
    query
        .active_filters()
        .all(|(key, expected)| row.category(key) == Some(expected))
}

fn compare<T: Refinable>(sort_key: SortKey, a: &T, b: &T) -> Ordering {
    match sort_key {
        SortKey::Original => Ordering::Equal,
        SortKey::Recent => b.timestamp().cmp(&a.timestamp()),
        SortKey::Popular => b.popularity().cmp(&a.popularity()),
        SortKey::Trending => b
            .is_trending()
            .cmp(&a.is_trending())
            .then_with(|| b.timestamp().cmp(&a.timestamp())),
    }
}

/// Applies search, then filters, then a stable sort.
///
/// The input slice is left untouched; rows that compare equal keep their
/// relative order.
pub fn refine<T: Refinable + Clone>(rows: &[T], query: &ListQuery) -> Vec<T> {
    let needle = query.search_term().trim().to_lowercase();

    let mut refined: Vec<T> = rows
        .iter()
        .filter(|row| needle.is_empty() || matches_search(*row, &needle))
        .filter(|row| matches_filters(*row, query))
        .cloned()
        .collect();

    if query.sort_key() != SortKey::Original {
        refined.sort_by(|a, b| compare(query.sort_key(), a, b));
    }

    refined
}

/// Refines `rows` and cuts out the page selected by `query`.
pub fn refine_page<T: Refinable + Clone>(rows: &[T], query: &ListQuery) -> Page<T> {
    Page::from_slice(refine(rows, query), query.page(), query.page_size())
}

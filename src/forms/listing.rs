//! Query strings of the list pages.
//!
//! Each form turns into a [`ListQuery`]. Categorical filters are normalised
//! to their display label so `member`, `Member` and `PROJECT_MEMBER` select
//! the same rows; unknown labels are rejected before any backend call.

use serde::Deserialize;
use validator::Validate;

use crate::domain::labels::{Labeled, ReportStatus, ReportType, UserRole, UserStatus};
use crate::domain::{expert, post, report, user};
use crate::forms::FormError;
use crate::listing::query::{FilterValue, ListQuery, SortKey};

const MAX_SEARCH_LENGTH: u64 = 100;

fn label_filter<E: Labeled>(raw: Option<&str>) -> Result<FilterValue, FormError> {
    match FilterValue::parse(raw.unwrap_or_default()) {
        FilterValue::All => Ok(FilterValue::All),
        FilterValue::Exact(value) => Ok(FilterValue::Exact(E::parse(&value)?.label().to_string())),
    }
}

fn base_query(
    page_size: usize,
    search: Option<&str>,
    sort: Option<&str>,
) -> Result<ListQuery, FormError> {
    let query = ListQuery::new(page_size)?
        .with_search_term(search.unwrap_or_default().trim())
        .with_sort_key(SortKey::parse(sort.unwrap_or_default())?);
    Ok(query)
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserListForm {
    #[validate(length(max = MAX_SEARCH_LENGTH))]
    pub search: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub page: Option<usize>,
}

impl UserListForm {
    pub fn into_query(self, page_size: usize) -> Result<ListQuery, FormError> {
        self.validate()?;
        let query = base_query(page_size, self.search.as_deref(), None)?
            .with_filter(user::ROLE_FILTER, label_filter::<UserRole>(self.role.as_deref())?)
            .with_filter(user::STATUS_FILTER, label_filter::<UserStatus>(self.status.as_deref())?)
            .with_page(self.page.unwrap_or(1));
        Ok(query)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReportListForm {
    #[validate(length(max = MAX_SEARCH_LENGTH))]
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
}

impl ReportListForm {
    pub fn into_query(self, page_size: usize) -> Result<ListQuery, FormError> {
        self.validate()?;
        let query = base_query(page_size, self.search.as_deref(), self.sort.as_deref())?
            .with_filter(report::TYPE_FILTER, label_filter::<ReportType>(self.report_type.as_deref())?)
            .with_filter(report::STATUS_FILTER, label_filter::<ReportStatus>(self.status.as_deref())?)
            .with_page(self.page.unwrap_or(1));
        Ok(query)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ExpertListForm {
    #[validate(length(max = MAX_SEARCH_LENGTH))]
    pub search: Option<String>,
    pub domain: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
}

impl ExpertListForm {
    pub fn into_query(self, page_size: usize) -> Result<ListQuery, FormError> {
        self.validate()?;
        let query = base_query(page_size, self.search.as_deref(), self.sort.as_deref())?
            .with_filter(
                expert::DOMAIN_FILTER,
                FilterValue::parse(self.domain.as_deref().unwrap_or_default()),
            )
            .with_page(self.page.unwrap_or(1));
        Ok(query)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct PostListForm {
    #[validate(length(max = MAX_SEARCH_LENGTH))]
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
}

impl PostListForm {
    pub fn into_query(self, page_size: usize) -> Result<ListQuery, FormError> {
        self.validate()?;
        let query = base_query(page_size, self.search.as_deref(), self.sort.as_deref())?
            .with_filter(
                post::CATEGORY_FILTER,
                FilterValue::parse(self.category.as_deref().unwrap_or_default()),
            )
            .with_page(self.page.unwrap_or(1));
        Ok(query)
    }
}

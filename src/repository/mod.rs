use crate::domain::comment::{Comment, NewComment};
use crate::domain::expert::Expert;
use crate::domain::labels::{Labeled, ReportStatus, UserRole, UserStatus};
use crate::domain::post::Post;
use crate::domain::report::Report;
use crate::domain::types::{PostId, ReportId, TypeConstraintError, UserId};
use crate::domain::user::{ROLE_FILTER, STATUS_FILTER, User};
use crate::listing::mutation::{Acknowledgement, LikeState};
use crate::listing::pagination::Page;
use crate::listing::query::ListQuery;
use crate::repository::errors::RepositoryResult;

#[cfg(feature = "server")]
pub mod api;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

#[cfg(feature = "server")]
pub use api::ApiRepository;

/// One-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

/// Server-side filters of the user directory, expressed in backend enums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub pagination: Pagination,
}

impl UserListQuery {
    pub fn new(per_page: usize) -> Self {
        Self {
            search: None,
            role: None,
            status: None,
            pagination: Pagination { page: 1, per_page },
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        let trimmed = term.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Pagination {
            page: page.max(1),
            per_page,
        };
        self
    }
}

impl TryFrom<&ListQuery> for UserListQuery {
    type Error = TypeConstraintError;

    /// Translates portal labels (`Member`, `Active`) into backend enums.
    /// Unknown labels fail here, before any request is issued.
    fn try_from(query: &ListQuery) -> Result<Self, Self::Error> {
        let mut list_query = UserListQuery::new(query.page_size())
            .search(query.search_term())
            .paginate(query.page(), query.page_size());

        if let Some(label) = query.filter(ROLE_FILTER).as_exact() {
            list_query = list_query.role(UserRole::parse(label)?);
        }
        if let Some(label) = query.filter(STATUS_FILTER).as_exact() {
            list_query = list_query.status(UserStatus::parse(label)?);
        }

        Ok(list_query)
    }
}

pub trait UserReader {
    fn list_users(&self, query: &UserListQuery) -> RepositoryResult<Page<User>>;
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
}

pub trait UserWriter {
    fn delete_user(&self, id: UserId) -> RepositoryResult<()>;
    fn update_user_status(&self, id: UserId, status: UserStatus) -> RepositoryResult<User>;
}

pub trait ReportReader {
    fn list_reports(&self) -> RepositoryResult<Vec<Report>>;
    fn get_report_by_id(&self, id: ReportId) -> RepositoryResult<Option<Report>>;
}

pub trait ReportWriter {
    fn update_report_status(&self, id: ReportId, status: ReportStatus) -> RepositoryResult<Report>;
    fn delete_report(&self, id: ReportId) -> RepositoryResult<()>;
}

pub trait ExpertReader {
    fn list_experts(&self) -> RepositoryResult<Vec<Expert>>;
}

pub trait PostReader {
    /// Posts with the like flag computed for `viewer`.
    fn list_posts(&self, viewer: UserId) -> RepositoryResult<Vec<Post>>;
    fn get_post_by_id(&self, id: PostId, viewer: UserId) -> RepositoryResult<Option<Post>>;
    fn list_comments(&self, post_id: PostId) -> RepositoryResult<Vec<Comment>>;
}

pub trait PostWriter {
    fn toggle_like(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> RepositoryResult<Acknowledgement<LikeState>>;
    fn delete_post(&self, id: PostId) -> RepositoryResult<()>;
    fn create_comment(&self, comment: &NewComment) -> RepositoryResult<Comment>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::query::FilterValue;

    #[test]
    fn labels_translate_to_backend_enums() {
        let query = ListQuery::default()
            .with_search_term("  john ")
            .with_filter(ROLE_FILTER, FilterValue::parse("Member"))
            .with_filter(STATUS_FILTER, FilterValue::parse("all"))
            .with_page(2);

        let list_query = UserListQuery::try_from(&query).unwrap();

        assert_eq!(list_query.search.as_deref(), Some("john"));
        assert_eq!(list_query.role, Some(UserRole::Member));
        assert_eq!(list_query.status, None);
        assert_eq!(list_query.pagination, Pagination { page: 2, per_page: 10 });
    }

    #[test]
    fn unknown_label_fails_before_dispatch() {
        let query = ListQuery::default().with_filter(ROLE_FILTER, FilterValue::parse("Wizard"));
        let err = UserListQuery::try_from(&query).unwrap_err();
        assert!(matches!(err, TypeConstraintError::UnknownVariant { kind: "role", .. }));
    }
}

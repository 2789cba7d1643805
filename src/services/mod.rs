//! Business rules behind the portal routes.
//!
//! Services are synchronous and generic over the repository traits so they
//! can run on the blocking pool against [`crate::repository::ApiRepository`]
//! and in tests against the mockall mocks.

use std::cell::RefCell;

use thiserror::Error;

use crate::domain::types::{PostId, ReportId, UserId};
use crate::dto::ListingData;
use crate::forms::moderation::ConfirmForm;
use crate::listing::Identified;
use crate::listing::mutation::{MutationError, PendingGuard, PendingMutations};
use crate::listing::pagination::Page;
use crate::listing::query::ListQuery;
use crate::listing::view::{FetchOutcome, ListView};
use crate::models::auth::AuthenticatedUser;
use crate::repository::errors::RepositoryError;

pub mod chat;
pub mod community;
pub mod experts;
pub mod reports;
pub mod users;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    Conflict(String),

    #[error("type constraint violation: {0}")]
    TypeConstraint(String),

    #[error("repository error: {0}")]
    Repository(RepositoryError),

    #[error("messaging error: {0}")]
    Messaging(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            err if err.is_authorization() => ServiceError::Unauthorized,
            err => ServiceError::Repository(err),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Row-level actions guarded against duplicate submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowAction {
    Like(UserId, PostId),
    DeletePost(PostId),
    DeleteUser(UserId),
    UserStatus(UserId),
    ReportStatus(ReportId),
    DeleteReport(ReportId),
}

pub fn ensure_role(user: &AuthenticatedUser, role: &str) -> ServiceResult<()> {
    if user.has_role(role) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

pub fn ensure_any_role(user: &AuthenticatedUser, roles: &[&str]) -> ServiceResult<()> {
    if roles.iter().any(|role| user.has_role(role)) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Destructive actions only run once the caller confirmed them.
pub(crate) fn ensure_confirmed(form: &ConfirmForm) -> ServiceResult<()> {
    if form.confirm {
        Ok(())
    } else {
        Err(MutationError::NotConfirmed.into())
    }
}

/// Claims `action` until the returned guard drops. A second claim while the
/// first is held is a conflict.
pub(crate) fn claim_row(
    pending: &PendingMutations<RowAction>,
    action: RowAction,
) -> ServiceResult<PendingGuard<'_, RowAction>> {
    pending
        .try_begin(action)
        .ok_or_else(|| MutationError::InFlight.into())
}

/// Loads `query` through a fresh [`ListView`], following a clamp to the last
/// page and adopting the page the source answered.
///
/// The typed error of a failed fetch is returned as is.
pub(crate) fn load_listing<T, F>(query: ListQuery, fetch: F) -> ServiceResult<ListingData<T>>
where
    T: Identified,
    F: Fn(&ListQuery) -> ServiceResult<Page<T>>,
{
    let requested_page = query.page();
    let failure = RefCell::new(None);
    let source = |query: &ListQuery| {
        fetch(query).map_err(|err| {
            let message = err.to_string();
            failure.replace(Some(err));
            message
        })
    };

    let mut view = ListView::new(query);
    if let FetchOutcome::Failed(message) = view.load(&source) {
        return Err(failure
            .into_inner()
            .unwrap_or(ServiceError::Internal(message)));
    }

    Ok(ListingData::from_view(view, requested_page))
}

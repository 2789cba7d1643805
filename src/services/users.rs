//! Services behind the admin and moderator user directories.

use crate::domain::labels::UserStatus;
use crate::domain::types::UserId;
use crate::domain::user::User;
use crate::dto::ListingData;
use crate::forms::listing::UserListForm;
use crate::forms::moderation::{ConfirmForm, StatusForm, StatusPayload};
use crate::listing::mutation::PendingMutations;
use crate::listing::query::ListQuery;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{UserListQuery, UserReader, UserWriter};
use crate::services::{
    RowAction, ServiceError, ServiceResult, claim_row, ensure_confirmed, ensure_role, load_listing,
};
use crate::{ADMIN_ROLE, MODERATOR_ROLE};

/// Runs `query` against the backend; search and filters are applied there.
fn load_users<R>(repo: &R, query: ListQuery) -> ServiceResult<ListingData<User>>
where
    R: UserReader + ?Sized,
{
    load_listing(query, |query| {
        let list_query = UserListQuery::try_from(query)?;
        repo.list_users(&list_query).map_err(|err| {
            log::error!("Failed to list users: {err}");
            ServiceError::from(err)
        })
    })
}

fn apply_status<R>(
    repo: &R,
    pending: &PendingMutations<RowAction>,
    id: UserId,
    status: UserStatus,
) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    let _guard = claim_row(pending, RowAction::UserStatus(id))?;

    let updated = repo.update_user_status(id, status).map_err(|err| {
        log::error!("Failed to update status of user {id}: {err}");
        err
    })?;

    Ok(updated)
}

/// Loads one page of the admin user directory.
pub fn list_users<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: UserListForm,
    page_size: usize,
) -> ServiceResult<ListingData<User>>
where
    R: UserReader + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let query = form.into_query(page_size)?;

    load_users(repo, query)
}

/// Loads one page of the moderator user directory.
pub fn list_users_for_moderation<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: UserListForm,
    page_size: usize,
) -> ServiceResult<ListingData<User>>
where
    R: UserReader + ?Sized,
{
    ensure_role(user, MODERATOR_ROLE)?;

    let query = form.into_query(page_size)?;

    load_users(repo, query)
}

/// Deletes an account after explicit confirmation.
///
/// Admins cannot delete their own account.
pub fn delete_user<R>(
    repo: &R,
    user: &AuthenticatedUser,
    pending: &PendingMutations<RowAction>,
    user_id: i64,
    form: ConfirmForm,
) -> ServiceResult<()>
where
    R: UserWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let id = UserId::new(user_id)?;

    ensure_confirmed(&form)?;

    if id == user.user_id()? {
        return Err(ServiceError::Form(
            "You cannot delete your own account".to_string(),
        ));
    }

    let _guard = claim_row(pending, RowAction::DeleteUser(id))?;

    repo.delete_user(id).map_err(|err| {
        log::error!("Failed to delete user {id}: {err}");
        err
    })?;

    Ok(())
}

/// Changes the status of any account.
pub fn change_user_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    pending: &PendingMutations<RowAction>,
    user_id: i64,
    form: StatusForm,
) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    ensure_role(user, ADMIN_ROLE)?;

    let id = UserId::new(user_id)?;
    let payload = StatusPayload::<UserStatus>::try_from(form)?;

    apply_status(repo, pending, id, payload.status)
}

/// Changes the status of a non-staff account on behalf of a moderator.
pub fn moderate_user_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    pending: &PendingMutations<RowAction>,
    user_id: i64,
    form: StatusForm,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    ensure_role(user, MODERATOR_ROLE)?;

    let id = UserId::new(user_id)?;
    let payload = StatusPayload::<UserStatus>::try_from(form)?;

    let target = repo.get_user_by_id(id)?.ok_or(ServiceError::NotFound)?;
    if target.role.is_staff() {
        log::warn!("Moderator {} tried to change staff account {id}", user.sub);
        return Err(ServiceError::Unauthorized);
    }

    apply_status(repo, pending, id, payload.status)
}

//! Community board: feed, likes and comments.

use crate::domain::comment::CommentThread;
use crate::domain::post::Post;
use crate::domain::types::{PostId, UserId};
use crate::dto::{CommentUpdate, LikeData, ListingData};
use crate::forms::community::{CommentForm, CommentPayload};
use crate::forms::listing::PostListForm;
use crate::forms::moderation::ConfirmForm;
use crate::listing::mutation::{Acknowledgement, Likeable, PendingMutations};
use crate::listing::refine::refine_page;
use crate::models::auth::AuthenticatedUser;
use crate::repository::{PostReader, PostWriter};
use crate::services::{
    RowAction, ServiceError, ServiceResult, claim_row, ensure_confirmed, load_listing,
};
use crate::{ADMIN_ROLE, MODERATOR_ROLE};

/// Loads the feed as seen by `user` and refines it locally.
pub fn list_posts<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: PostListForm,
    page_size: usize,
) -> ServiceResult<ListingData<Post>>
where
    R: PostReader + ?Sized,
{
    let viewer = user.user_id()?;
    let query = form.into_query(page_size)?;

    let posts = repo.list_posts(viewer).map_err(|err| {
        log::error!("Failed to list posts: {err}");
        err
    })?;

    load_listing(query, |query| Ok(refine_page(&posts, query)))
}

fn refresh_like_state<R>(repo: &R, post_id: PostId, viewer: UserId) -> ServiceResult<LikeData>
where
    R: PostReader + ?Sized,
{
    let post = repo
        .get_post_by_id(post_id, viewer)?
        .ok_or(ServiceError::NotFound)?;

    Ok(LikeData {
        post_id,
        state: post.like_state(),
        refreshed: true,
    })
}

/// Toggles the like of `user` on a post.
///
/// A second toggle for the same post and user while one is in flight is
/// refused. When the backend answer cannot be read the post is fetched again
/// so the caller still gets the authoritative count.
pub fn toggle_like<R>(
    repo: &R,
    user: &AuthenticatedUser,
    pending: &PendingMutations<RowAction>,
    post_id: i64,
) -> ServiceResult<LikeData>
where
    R: PostReader + PostWriter + ?Sized,
{
    let viewer = user.user_id()?;
    let post_id = PostId::new(post_id)?;

    let _guard = claim_row(pending, RowAction::Like(viewer, post_id))?;

    let acknowledgement = repo.toggle_like(post_id, viewer).map_err(|err| {
        log::error!("Failed to toggle like on post {post_id}: {err}");
        err
    })?;

    match acknowledgement {
        Acknowledgement::Confirmed(state) => Ok(LikeData {
            post_id,
            state,
            refreshed: false,
        }),
        Acknowledgement::Ambiguous => {
            log::warn!("Like on post {post_id} was not acknowledged clearly; refreshing");
            refresh_like_state(repo, post_id, viewer)
        }
    }
}

pub fn list_comments<R>(repo: &R, post_id: i64) -> ServiceResult<CommentThread>
where
    R: PostReader + ?Sized,
{
    let post_id = PostId::new(post_id)?;

    let comments = repo.list_comments(post_id).map_err(|err| {
        log::error!("Failed to list comments of post {post_id}: {err}");
        err
    })?;

    Ok(CommentThread::new(post_id, comments))
}

/// Creates a comment or a reply.
///
/// Top-level comments come back for appending; a reply comes back with the
/// whole tree fetched again.
pub fn add_comment<R>(
    repo: &R,
    user: &AuthenticatedUser,
    post_id: i64,
    form: CommentForm,
) -> ServiceResult<CommentUpdate>
where
    R: PostReader + PostWriter + ?Sized,
{
    let author_id = user.user_id()?;
    let post_id = PostId::new(post_id)?;
    let payload = CommentPayload::try_from(form)?;

    let new_comment = payload.into_domain(post_id, author_id);

    let created = repo.create_comment(&new_comment).map_err(|err| {
        log::error!("Failed to add comment to post {post_id}: {err}");
        err
    })?;

    if !new_comment.is_reply() && !created.is_reply() {
        return Ok(CommentUpdate::Appended { comment: created });
    }

    let thread = list_comments(repo, post_id.get())?;
    Ok(CommentUpdate::Refetched { thread })
}

/// Deletes a post; only its author and staff may do so.
pub fn delete_post<R>(
    repo: &R,
    user: &AuthenticatedUser,
    pending: &PendingMutations<RowAction>,
    post_id: i64,
    form: ConfirmForm,
) -> ServiceResult<()>
where
    R: PostReader + PostWriter + ?Sized,
{
    let viewer = user.user_id()?;
    let post_id = PostId::new(post_id)?;

    ensure_confirmed(&form)?;

    let post = repo
        .get_post_by_id(post_id, viewer)?
        .ok_or(ServiceError::NotFound)?;

    let is_staff = user.has_role(ADMIN_ROLE) || user.has_role(MODERATOR_ROLE);
    if post.author_id != viewer && !is_staff {
        return Err(ServiceError::Unauthorized);
    }

    let _guard = claim_row(pending, RowAction::DeletePost(post_id))?;

    repo.delete_post(post_id).map_err(|err| {
        log::error!("Failed to delete post {post_id}: {err}");
        err
    })?;

    Ok(())
}

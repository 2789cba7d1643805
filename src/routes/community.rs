use actix_web::{Responder, get, post, web};

use crate::forms::community::CommentForm;
use crate::forms::listing::PostListForm;
use crate::forms::moderation::ConfirmForm;
use crate::listing::mutation::PendingMutations;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::ApiRepository;
use crate::routes::{respond, run_blocking};
use crate::services::{RowAction, community as community_service};

#[get("/community/posts")]
pub async fn list_posts(
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    server_config: web::Data<ServerConfig>,
    web::Query(form): web::Query<PostListForm>,
) -> impl Responder {
    let repo = repo.with_token(&user.token);
    let page_size = server_config.page_size();

    let result =
        run_blocking(move || community_service::list_posts(&repo, &user, form, page_size)).await;

    respond(result, "list posts")
}

#[post("/community/posts/{post_id}/like")]
pub async fn toggle_like(
    post_id: web::Path<i64>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    pending: web::Data<PendingMutations<RowAction>>,
) -> impl Responder {
    let repo = repo.with_token(&user.token);
    let post_id = post_id.into_inner();
    let pending = pending.into_inner();

    let result =
        run_blocking(move || community_service::toggle_like(&repo, &user, &pending, post_id))
            .await;

    respond(result, "toggle like")
}

#[post("/community/posts/{post_id}/delete")]
pub async fn delete_post(
    post_id: web::Path<i64>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    pending: web::Data<PendingMutations<RowAction>>,
    web::Json(form): web::Json<ConfirmForm>,
) -> impl Responder {
    let repo = repo.with_token(&user.token);
    let post_id = post_id.into_inner();
    let pending = pending.into_inner();

    let result = run_blocking(move || {
        community_service::delete_post(&repo, &user, &pending, post_id, form)
    })
    .await;

    respond(result, "delete post")
}

#[get("/community/posts/{post_id}/comments")]
pub async fn list_comments(
    post_id: web::Path<i64>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
) -> impl Responder {
    let repo = repo.with_token(&user.token);
    let post_id = post_id.into_inner();

    let result = run_blocking(move || community_service::list_comments(&repo, post_id)).await;

    respond(result, "list comments")
}

#[post("/community/posts/{post_id}/comments")]
pub async fn add_comment(
    post_id: web::Path<i64>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    web::Json(form): web::Json<CommentForm>,
) -> impl Responder {
    let repo = repo.with_token(&user.token);
    let post_id = post_id.into_inner();

    let result =
        run_blocking(move || community_service::add_comment(&repo, &user, post_id, form)).await;

    respond(result, "add comment")
}

use actix_web::{Responder, get, post, web};

use crate::forms::listing::UserListForm;
use crate::forms::moderation::StatusForm;
use crate::listing::mutation::PendingMutations;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::ApiRepository;
use crate::routes::{respond, run_blocking};
use crate::services::{RowAction, users as users_service};

#[get("/moderator/users")]
pub async fn list_users(
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    server_config: web::Data<ServerConfig>,
    web::Query(form): web::Query<UserListForm>,
) -> impl Responder {
    let repo = repo.with_token(&user.token);
    let page_size = server_config.page_size();

    let result = run_blocking(move || {
        users_service::list_users_for_moderation(&repo, &user, form, page_size)
    })
    .await;

    respond(result, "list users for moderation")
}

#[post("/moderator/users/{user_id}/status")]
pub async fn change_user_status(
    user_id: web::Path<i64>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    pending: web::Data<PendingMutations<RowAction>>,
    web::Json(form): web::Json<StatusForm>,
) -> impl Responder {
    let repo = repo.with_token(&user.token);
    let user_id = user_id.into_inner();
    let pending = pending.into_inner();

    let result = run_blocking(move || {
        users_service::moderate_user_status(&repo, &user, &pending, user_id, form)
    })
    .await;

    respond(result, "moderate user status")
}

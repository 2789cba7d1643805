use actix_web::{Responder, get, web};

use crate::forms::listing::ExpertListForm;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::ApiRepository;
use crate::routes::{respond, run_blocking};
use crate::services::experts as experts_service;

#[get("/experts")]
pub async fn list_experts(
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    server_config: web::Data<ServerConfig>,
    web::Query(form): web::Query<ExpertListForm>,
) -> impl Responder {
    let repo = repo.with_token(&user.token);
    let page_size = server_config.page_size();

    let result = run_blocking(move || experts_service::list_experts(&repo, form, page_size)).await;

    respond(result, "list experts")
}

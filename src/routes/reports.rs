use actix_web::{Responder, get, post, web};

use crate::forms::listing::ReportListForm;
use crate::forms::moderation::{ConfirmForm, StatusForm};
use crate::listing::mutation::PendingMutations;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::ApiRepository;
use crate::routes::{respond, run_blocking};
use crate::services::{RowAction, reports as reports_service};

#[get("/reports")]
pub async fn list_reports(
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    server_config: web::Data<ServerConfig>,
    web::Query(form): web::Query<ReportListForm>,
) -> impl Responder {
    let repo = repo.with_token(&user.token);
    let page_size = server_config.page_size();

    let result =
        run_blocking(move || reports_service::list_reports(&repo, &user, form, page_size)).await;

    respond(result, "list reports")
}

#[post("/reports/{report_id}/status")]
pub async fn update_report_status(
    report_id: web::Path<i64>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    pending: web::Data<PendingMutations<RowAction>>,
    web::Json(form): web::Json<StatusForm>,
) -> impl Responder {
    let repo = repo.with_token(&user.token);
    let report_id = report_id.into_inner();
    let pending = pending.into_inner();

    let result = run_blocking(move || {
        reports_service::update_report_status(&repo, &user, &pending, report_id, form)
    })
    .await;

    respond(result, "update report status")
}

#[post("/reports/{report_id}/delete")]
pub async fn delete_report(
    report_id: web::Path<i64>,
    user: AuthenticatedUser,
    repo: web::Data<ApiRepository>,
    pending: web::Data<PendingMutations<RowAction>>,
    web::Json(form): web::Json<ConfirmForm>,
) -> impl Responder {
    let repo = repo.with_token(&user.token);
    let report_id = report_id.into_inner();
    let pending = pending.into_inner();

    let result = run_blocking(move || {
        reports_service::delete_report(&repo, &user, &pending, report_id, form)
    })
    .await;

    respond(result, "delete report")
}

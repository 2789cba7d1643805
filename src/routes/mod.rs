//! JSON endpoints of the portal.

use actix_web::{HttpResponse, http::StatusCode, web};

use crate::dto::ErrorBody;
use crate::repository::errors::RepositoryError;
use crate::services::{ServiceError, ServiceResult};

pub mod admin;
pub mod chat;
pub mod community;
pub mod experts;
pub mod moderator;
pub mod reports;
pub mod session;

/// Runs a service call on the blocking pool.
///
/// Backend calls are synchronous HTTP requests and must stay off the Actix
/// workers.
pub(crate) async fn run_blocking<T, F>(call: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(call).await.unwrap_or_else(|err| {
        Err(ServiceError::Internal(format!("blocking task failed: {err}")))
    })
}

fn status_of(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Unauthorized => StatusCode::FORBIDDEN,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Form(_) | ServiceError::TypeConstraint(_) => StatusCode::BAD_REQUEST,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Repository(RepositoryError::Validation(_)) => StatusCode::BAD_REQUEST,
        ServiceError::Repository(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Messaging(_) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps a service failure onto an HTTP response.
///
/// Client errors carry their message; server-side failures are logged and
/// answered with a generic one.
pub(crate) fn error_response(err: ServiceError, action: &str) -> HttpResponse {
    let status = status_of(&err);
    let message = match &err {
        ServiceError::Unauthorized => "Insufficient permissions".to_string(),
        ServiceError::NotFound => "Not found".to_string(),
        ServiceError::Form(message) | ServiceError::Conflict(message) => message.clone(),
        ServiceError::TypeConstraint(message) => message.clone(),
        ServiceError::Repository(RepositoryError::Validation(message)) => message.clone(),
        _ => {
            log::error!("Failed to {action}: {err}");
            "Something went wrong. Please try again.".to_string()
        }
    };

    HttpResponse::build(status).json(ErrorBody::new(message))
}

/// Serialises a successful result as JSON, or maps the error.
pub(crate) fn respond<T: serde::Serialize>(result: ServiceResult<T>, action: &str) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(err) => error_response(err, action),
    }
}

/// Registers every portal endpoint.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(admin::list_users)
        .service(admin::delete_user)
        .service(admin::change_user_status)
        .service(moderator::list_users)
        .service(moderator::change_user_status)
        .service(reports::list_reports)
        .service(reports::update_report_status)
        .service(reports::delete_report)
        .service(experts::list_experts)
        .service(community::list_posts)
        .service(community::toggle_like)
        .service(community::delete_post)
        .service(community::list_comments)
        .service(community::add_comment)
        .service(chat::send_message)
        .service(session::sign_in)
        .service(session::sign_out);
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[actix_web::test]
    async fn conflict_maps_to_409_with_message() {
        let response = error_response(ServiceError::Conflict("busy".to_string()), "like post");
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"busy"}"#);
    }

    #[actix_web::test]
    async fn transport_failures_hide_details() {
        let response = error_response(
            ServiceError::Repository(RepositoryError::Transport("10.0.0.3 refused".to_string())),
            "list users",
        );
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = to_bytes(response.into_body()).await.unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("10.0.0.3"));
    }

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(status_of(&ServiceError::Unauthorized), StatusCode::FORBIDDEN);
        assert_eq!(status_of(&ServiceError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(&ServiceError::Form("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
    }
}

use actix_session::Session;
use actix_web::{HttpResponse, Responder, post, web};

use crate::dto::{ErrorBody, LoginRequired};
use crate::forms::chat::ChatMessageForm;
use crate::messaging::ChatPublisher;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::routes::{error_response, respond};
use crate::services::chat as chat_service;

/// Session key holding the message of a signed-out visitor.
pub const PENDING_CHAT_KEY: &str = "pending_chat";

/// Publishes a direct message.
///
/// Signed-out visitors get `401` with the login URL; their message is kept
/// in the session and sent once they sign in.
#[post("/chat/messages")]
pub async fn send_message(
    user: Option<AuthenticatedUser>,
    session: Session,
    publisher: web::Data<dyn ChatPublisher>,
    server_config: web::Data<ServerConfig>,
    web::Json(form): web::Json<ChatMessageForm>,
) -> impl Responder {
    let Some(user) = user else {
        let intent = match chat_service::defer_message(form) {
            Ok(intent) => intent,
            Err(err) => return error_response(err, "keep chat message"),
        };

        if let Err(err) = session.insert(PENDING_CHAT_KEY, &intent) {
            log::error!("Failed to keep chat message in the session: {err}");
            return HttpResponse::InternalServerError()
                .json(ErrorBody::new("Could not keep your message"));
        }

        return HttpResponse::Unauthorized().json(LoginRequired {
            login_url: server_config.login_url.clone(),
            pending: intent,
        });
    };

    respond(
        chat_service::send_message(publisher.get_ref(), &user, form),
        "send chat message",
    )
}

use actix_identity::Identity;
use actix_session::Session;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, post, web};

use crate::domain::chat::{ChatMessage, PendingChatIntent};
use crate::dto::{ErrorBody, SessionData};
use crate::forms::session::LoginForm;
use crate::messaging::ChatPublisher;
use crate::models::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::routes::chat::PENDING_CHAT_KEY;
use crate::routes::error_response;
use crate::services::{ServiceError, chat as chat_service};

/// Sends the message a visitor left before signing in, if any.
fn resume_pending(
    session: &Session,
    publisher: &dyn ChatPublisher,
    user: &AuthenticatedUser,
) -> Option<ChatMessage> {
    let intent = match session.remove_as::<PendingChatIntent>(PENDING_CHAT_KEY)? {
        Ok(intent) => intent,
        Err(raw) => {
            log::warn!("Dropping unreadable pending chat message: {raw}");
            return None;
        }
    };

    match chat_service::resume_message(publisher, user, intent) {
        Ok(message) => Some(message),
        Err(err) => {
            log::error!("Failed to resume chat message for {}: {err}", user.sub);
            None
        }
    }
}

#[post("/session")]
pub async fn sign_in(
    req: HttpRequest,
    session: Session,
    publisher: web::Data<dyn ChatPublisher>,
    server_config: web::Data<ServerConfig>,
    web::Json(form): web::Json<LoginForm>,
) -> impl Responder {
    let user = match chat_service::sign_in(&form, &server_config.secret) {
        Ok(user) => user,
        Err(_) => {
            return HttpResponse::Unauthorized().json(ErrorBody::new("Invalid or expired token"));
        }
    };

    if let Err(err) = Identity::login(&req.extensions(), user.token.clone()) {
        return error_response(ServiceError::Internal(err.to_string()), "sign in");
    }

    let resumed = resume_pending(&session, publisher.get_ref(), &user);

    HttpResponse::Ok().json(SessionData {
        name: user.name,
        email: user.email,
        roles: user.roles,
        resumed,
    })
}

#[post("/logout")]
pub async fn sign_out(identity: Option<Identity>) -> impl Responder {
    if let Some(identity) = identity {
        identity.logout();
    }
    HttpResponse::NoContent().finish()
}

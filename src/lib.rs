#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

pub mod domain;
pub mod error_conversions;
pub mod listing;
pub mod models;
pub mod repository;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod messaging;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

pub const ADMIN_ROLE: &str = "ADMIN";
pub const MODERATOR_ROLE: &str = "MODERATOR";
pub const EXPERT_ROLE: &str = "DOMAIN_EXPERT";
pub const MEMBER_ROLE: &str = "PROJECT_MEMBER";

/// Builds and runs the Actix-Web HTTP server.
///
/// `repo` is created by the caller outside the async runtime because the
/// blocking HTTP client cannot be built or dropped inside it.
#[cfg(feature = "server")]
pub async fn run(
    server_config: models::config::ServerConfig,
    repo: repository::ApiRepository,
) -> std::io::Result<()> {
    use std::sync::Arc;

    use crate::listing::mutation::PendingMutations;
    use crate::messaging::{ChatPublisher, StompPublisher};
    use crate::services::RowAction;

    // Background STOMP publisher for outbound direct messages.
    let publisher: Arc<dyn ChatPublisher> =
        Arc::new(StompPublisher::start(server_config.stomp_options()));
    let publisher = web::Data::from(publisher);

    let pending = web::Data::new(PendingMutations::<RowAction>::new());

    let secret_key = Key::from(server_config.secret.as_bytes());

    let bind_address = (server_config.address.clone(), server_config.port);
    let repo = web::Data::new(repo);
    let server_config = web::Data::new(server_config);

    log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
            .app_data(repo.clone())
            .app_data(publisher.clone())
            .app_data(pending.clone())
            .app_data(server_config.clone())
    })
    .bind(bind_address)?
    .run()
    .await
}

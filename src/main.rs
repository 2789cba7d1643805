use std::env;

use config::Config;
use dotenvy::dotenv;

use mentor_portal::models::config::ServerConfig;
use mentor_portal::repository::ApiRepository;
use mentor_portal::run;

fn main() -> std::io::Result<()> {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let settings = Config::builder()
        // Add `./config/default.yaml`
        .add_source(config::File::with_name("config/default"))
        // Add environment-specific overrides
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        // Add settings from the environment (with a prefix of APP)
        .add_source(config::Environment::with_prefix("APP"))
        .build();

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    let server_config = match settings.try_deserialize::<ServerConfig>() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    if server_config.secret.len() < 64 {
        log::error!("The session secret must be at least 64 bytes long");
        std::process::exit(1);
    }

    // The blocking HTTP client owns its own runtime and has to live outside
    // the Actix one; this handle keeps it alive until the server has stopped.
    let repo = match ApiRepository::new(&server_config.api_base_url, server_config.api_timeout()) {
        Ok(repo) => repo,
        Err(err) => {
            log::error!("Error building backend client: {err}");
            std::process::exit(1);
        }
    };

    let result = actix_web::rt::System::new().block_on(run(server_config, repo.clone()));
    drop(repo);
    result
}

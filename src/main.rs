mod analytics;
mod auth;
mod clients;
mod config;
mod database;
mod error;
mod filters;
mod fixtures;
mod handlers;
mod models;
mod moderation;
mod normalize;
mod store;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use crate::clients::legacy::LegacyCatalogClient;
use crate::config::AppConfig;
use crate::database::Database;
use crate::store::{CatalogStore, MemoryStore};

fn build_cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if allowed_origins.is_empty() {
        return cors.allow_any_origin();
    }

    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|err| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
    })?;
    let bind_address = config.bind_address();

    let store = match (&config.database_url, config.use_mocks) {
        (Some(database_url), false) => {
            let db = Database::connect(database_url).await.map_err(|err| {
                log::error!("Failed to initialize database: {err:?}");
                std::io::Error::new(std::io::ErrorKind::Other, err)
            })?;
            log::info!("Database connected and migrations applied");
            CatalogStore::Postgres(db)
        }
        _ => {
            log::warn!("USE_MOCKS enabled: serving the in-memory fixture catalog");
            CatalogStore::Memory(MemoryStore::seeded())
        }
    };

    let store_data = web::Data::new(store);
    let legacy_client = web::Data::new(LegacyCatalogClient::new(
        &config.legacy_api_base_url,
        config.legacy_api_timeout,
        config.use_mocks,
    ));
    let allowed_origins = config.cors_allowed_origins.clone();

    log::info!(
        "🚀 Starting Tourism Portal Service on {} (legacy API: {})",
        bind_address,
        legacy_client.base_url()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(store_data.clone())
            .app_data(legacy_client.clone())
            .wrap(build_cors(&allowed_origins))
            .wrap(Logger::default())
            .service(web::scope("/api/v1").configure(handlers::configure))
    })
    .bind(&bind_address)?
    .run()
    .await
}

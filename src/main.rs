mod api;
mod config;
mod database;
mod jobs;
mod middleware;
mod models;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::database::{MongoDB, MongoTokenStore};
use crate::state::AppState;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    log::error!("❌ {}: {}", context, err);
    std::io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    log::info!("🚀 Starting Rizon backend...");
    log::info!("📊 Database: {}", config.db_name);

    // Initialize MongoDB connection
    let db = MongoDB::connect(&config.mongodb_uri, &config.db_name)
        .await
        .map_err(|e| startup_error("Failed to connect to MongoDB", e))?;
    log::info!("✅ MongoDB connected successfully");

    // Unique indexes back every exactly-once guarantee; refuse to serve without them.
    db.ensure_indexes()
        .await
        .map_err(|e| startup_error("Failed to create indexes", e))?;

    let state = AppState::from_config(&db, &config)
        .map_err(|e| startup_error("Failed to build services", e))?;
    let state_data = web::Data::new(state);

    log::info!("📅 Starting background jobs...");
    jobs::token_purge::start_token_purge_job(Arc::new(MongoTokenStore::new(&db)));

    let bind_addr = (config.host.clone(), config.port);
    let cors_origins = config.cors_allowed_origins.clone();

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);
    log::info!(
        "📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json",
        config.host,
        config.port
    );

    // Start HTTP server
    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PATCH", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                header::ACCEPT,
            ])
            .expose_headers(vec![header::CONTENT_TYPE])
            .max_age(3600);

        if cors_origins.is_empty() {
            cors = cors.allow_any_origin();
        } else {
            for origin in &cors_origins {
                cors = cors.allowed_origin(origin);
            }
        }

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the access map application.
//!
//! Serves the record routes (locations, reports, emotion ratings) and the
//! analytics routes that aggregate them into per-area statistics and
//! narrative reports. Records are persisted in a `SQLite` database at
//! `DATABASE_PATH` (default `data/access_map.db`); narratives are produced
//! by the LLM provider selected from the environment.

pub mod error;
mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use access_map_ai::NarrativeGenerator;
use access_map_database::RecordStore;
use access_map_database::db::{self, open_db};
use access_map_database::queries::SqliteRecordStore;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{App, HttpServer, middleware, web};

/// Shared application state.
pub struct AppState {
    /// Record store for locations, reports, and emotion ratings.
    pub store: Arc<dyn RecordStore>,
    /// Narrative generator for the LLM-backed reports.
    pub generator: Arc<dyn NarrativeGenerator>,
}

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind_addr: String,
    /// Port to listen on.
    pub port: u16,
    /// Records database file.
    pub database_path: PathBuf,
    /// The only origin allowed to make cross-origin requests.
    pub frontend_url: String,
}

impl ServerConfig {
    /// Reads `BIND_ADDR`, `PORT`, `DATABASE_PATH`, and `FRONTEND_URL`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_path: db::path_from_env(),
            frontend_url: std::env::var("FRONTEND_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
        }
    }
}

/// Origin allowed when `FRONTEND_URL` is unset.
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// CORS policy admitting only `frontend_url` with the methods and headers
/// the frontend uses.
fn cors(frontend_url: &str) -> Cors {
    Cors::default()
        .allowed_origin(frontend_url)
        .allowed_methods(["GET", "POST", "PATCH", "DELETE"])
        .allowed_header(header::CONTENT_TYPE)
}

/// Registers the `/api` routes and the extractor error handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(handlers::health))
                .service(
                    web::scope("/analytics")
                        .route("/llm-report", web::get().to(handlers::llm_report))
                        .route(
                            "/detailed-report-area",
                            web::get().to(handlers::detailed_report_area),
                        )
                        .route(
                            "/detailed-report-location",
                            web::get().to(handlers::detailed_report_location),
                        )
                        .route("/area-analysis", web::get().to(handlers::area_analysis))
                        .route(
                            "/location-reports",
                            web::get().to(handlers::location_reports),
                        )
                        .route(
                            "/location-emotions",
                            web::get().to(handlers::location_emotions),
                        ),
                )
                .route("/locations", web::get().to(handlers::list_locations))
                .route("/locations", web::post().to(handlers::create_location))
                .route(
                    "/locations/area/{area}",
                    web::get().to(handlers::locations_in_area),
                )
                .route("/locations/{id}", web::get().to(handlers::get_location))
                .route("/locations/{id}", web::patch().to(handlers::update_location))
                .route("/locations/{id}", web::delete().to(handlers::delete_location))
                .route("/reports", web::get().to(handlers::list_reports))
                .route("/reports", web::post().to(handlers::create_report))
                .route("/emotions", web::get().to(handlers::list_emotions))
                .route("/emotions", web::post().to(handlers::create_emotion)),
        );
}

/// Starts the access map API server.
///
/// Opens the records database, selects the narrative generator from the
/// environment, and starts the Actix-Web HTTP server. The caller provides
/// the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the database cannot be opened, no
/// narrative generator is configured, or the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Opening records database at {}...", config.database_path.display());
    let db = open_db(&config.database_path)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    log::info!("Configuring narrative generator...");
    let generator = access_map_ai::create_generator_from_env()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let state = web::Data::new(AppState {
        store: Arc::new(SqliteRecordStore::new(db)),
        generator: Arc::from(generator),
    });

    log::info!("Allowing CORS requests from {}", config.frontend_url);

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    let frontend_url = config.frontend_url.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&frontend_url))
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}

//! Verdict report generator - Main entry point.
//!
//! Runs the report pipeline once; with `--serve`, keeps running and exposes
//! the data endpoint plus the generated report over HTTP.

mod api;
mod config;
mod error;
mod middleware;
mod models;
mod services;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::ApiDoc;
use crate::config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - VERDICT_RUN_FILE must point at the current-run JSON document");
            error!("  - VERDICT_MAX_TREND_POINTS and VERDICT_PORT must be numeric");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Verdict Report Generator");
    info!("  input:  {}", config.run_file.display());
    info!("  output: {}", config.output_dir.display());
    info!("========================================");

    // Generate the report. Recoverable problems (one bad history file, one
    // missing attachment) degrade single data points inside the pipeline;
    // anything that reaches this level is fatal.
    if let Err(e) = services::generate(&config).await {
        error!("Report generation failed: {}", e);
        std::process::exit(1);
    }

    let serve = std::env::args().any(|arg| arg == "--serve");
    if !serve {
        return Ok(());
    }

    let bind_address = config.bind_address();
    let output_dir = config.output_dir.clone();
    info!("Starting data endpoint at http://{}", bind_address);

    let workers = num_cpus::get().min(4);
    HttpServer::new(move || {
        // The dashboard is a separate origin during development.
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_methods(vec!["GET", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::RequestLogger)
            .app_data(web::Data::new(config.clone()))
            .service(
                web::scope("/api/v1")
                    .configure(api::configure_health_routes)
                    .configure(api::configure_pulse_routes),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            // The generated report itself, index.html first.
            .service(Files::new("/report", output_dir.clone()).index_file("index.html"))
    })
    .workers(workers)
    .bind(&bind_address)?
    .run()
    .await
}

use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use heirloom_market::app_state::AppState;
use heirloom_market::config::AppConfig;
use heirloom_market::db;
use heirloom_market::routes;
use heirloom_market::services::gemini::GeminiClient;

#[tokio::main]
async fn main() {
    // Structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing heirloom-market server");

    // Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    metrics::describe_counter!("appraisal_requests_total", "Appraisal requests received");
    metrics::describe_counter!(
        "appraisal_rejected_total",
        "Appraisal requests rejected by validation"
    );
    metrics::describe_counter!(
        "appraisal_external_total",
        "Estimates produced by the external model"
    );
    metrics::describe_counter!(
        "appraisal_fallback_total",
        "Estimates produced by the local spot-price calculation"
    );

    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Initializing Gemini valuation client");
    let valuer = GeminiClient::from_config(&config).expect("Failed to initialize Gemini client");

    let state = AppState::new(db_pool, Arc::new(valuer));

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/v1/appraisal", post(routes::appraisal::appraise))
        .route(
            "/api/v1/listings",
            get(routes::listings::list_listings).post(routes::listings::create_listing),
        )
        .route(
            "/api/v1/listings/{id}",
            get(routes::listings::get_listing)
                .put(routes::listings::update_listing)
                .delete(routes::listings::delete_listing),
        )
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)); // photos arrive inline as base64

    tracing::info!("Starting heirloom-market on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}

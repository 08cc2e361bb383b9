//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{FileSettingsStore, GeminiAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, AppState},
};
use auramind_core::ConfigResolver;
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");
    if config.gemini_api_key.is_none() {
        info!("No GEMINI_API_KEY set; users must save a key in Settings.");
    }

    // --- 2. Initialize Service Adapters ---
    let http_client = reqwest::Client::builder()
        .build()
        .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;
    let model_service = Arc::new(GeminiAdapter::new(
        http_client,
        config.gemini_api_base.clone(),
    ));
    let settings_store = Arc::new(FileSettingsStore::new(config.settings_path.clone()));
    info!("Settings persisted at {:?}", config.settings_path);
    let resolver = ConfigResolver::new(config.gemini_api_key.clone(), settings_store);

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(model_service, resolver));

    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    // --- 4. Create the Web Router ---
    let app = build_router(app_state).layer(cors);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

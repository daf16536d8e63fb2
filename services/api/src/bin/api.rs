//! services/api/src/bin/api.rs

use api_lib::{
    adapters::DocumentTextExtractor,
    assistant::StudyAssistant,
    config::Config,
    error::ApiError,
    storage::OutputStore,
    web::{self, rest::ApiDoc, state::AppState},
};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method,
    },
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Assistant & Adapters ---
    // A missing API key stops the process here, before any request is served.
    let assistant = StudyAssistant::from_config(&config)?;
    let extractor = Arc::new(DocumentTextExtractor::new());
    let store = OutputStore::new(config.output_root.clone());
    info!("Writing outputs under {}", store.root().display());

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), assistant, extractor, store));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(web::router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

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

// Axum start-up code: the JSON API under /api, /health, and the embedded
// single-page form served at / that drives the API from a browser.
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod static_files;
pub mod templates;

use axum::Router;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::WebConfig;
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::ui_routes())
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(config: WebConfig, state: Arc<AppState>) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
pub(crate) fn test_state(generator: Box<dyn crate::llm::SqlGenerator>) -> Arc<AppState> {
    use crate::db::schema_registry::SchemaRegistry;
    use crate::llm::LlmManager;
    use crate::query::QueryService;

    let query = QueryService::new(
        Arc::new(SchemaRegistry::builtin()),
        Arc::new(LlmManager::with_generator(generator, "test-model")),
    );
    Arc::new(AppState::new(query))
}

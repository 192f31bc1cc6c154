use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use super::handlers;
use super::static_files::static_handler;
use super::state::AppState;

// UI Routes - web interface
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::ui::index_handler))
        .route("/static/{*path}", get(static_handler))
}

// API Routes - REST API for programmatic access
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::api::health_check))
        .nest(
            "/api",
            Router::new()
                // Generation and simulated execution
                .route("/text-to-sql", post(handlers::api::text_to_sql))
                .route("/execute", post(handlers::api::execute_query))

                // Metadata
                .route("/databases", get(handlers::api::list_databases))
                .route("/schemas/{database}", get(handlers::api::get_schema))

                // System status
                .route("/status", get(handlers::api::system_status)),
        )
}

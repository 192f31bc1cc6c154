use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::query::models::{ExecutionRequest, ExecutionResult, GenerationRequest, GenerationResult};
use crate::web::error::ApiError;
use crate::web::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseList {
    pub databases: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaResponse {
    pub database: String,
    pub schema: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub database_count: usize,
    pub model: String,
}

// Generation failures are reported inside the body; this endpoint
// always answers 200 for a well-formed request.
pub async fn text_to_sql(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerationRequest>,
) -> Json<GenerationResult> {
    info!("Text-to-SQL request for database {}", payload.database);
    debug!("Question: {}", payload.question);

    Json(state.query.generate_sql(&payload).await)
}

pub async fn execute_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExecutionRequest>,
) -> Result<Json<ExecutionResult>, ApiError> {
    info!("Execute request for database {}", payload.database);

    let result = state.query.execute_sql(&payload)?;
    Ok(Json(result))
}

pub async fn list_databases(State(state): State<Arc<AppState>>) -> Json<DatabaseList> {
    Json(DatabaseList {
        databases: state.query.registry().list_names(),
    })
}

pub async fn get_schema(
    State(state): State<Arc<AppState>>,
    Path(database): Path<String>,
) -> Result<Json<SchemaResponse>, ApiError> {
    let schema = state.query.registry().lookup(&database)?;

    Ok(Json(SchemaResponse {
        schema: schema.to_string(),
        database,
    }))
}

pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let uptime = chrono::Utc::now()
        .signed_duration_since(state.startup_time)
        .num_seconds();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        database_count: state.query.registry().len(),
        model: state.query.model().to_string(),
    })
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::db::schema_registry::SchemaError;
use crate::query::QueryError;

/// A failure reported through the HTTP status line, with a JSON
/// `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        let status = match &err {
            QueryError::UnsupportedDatabase(_) => StatusCode::NOT_FOUND,
            QueryError::EmptyQuestion | QueryError::UnsafeQuery | QueryError::InvalidLimit => {
                StatusCode::BAD_REQUEST
            }
            QueryError::Completion(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        QueryError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: &self.detail })).into_response()
    }
}

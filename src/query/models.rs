use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Success,
    Error,
}

// Input for natural language to SQL generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub question: String,
    pub database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

// Outcome of SQL generation. Failures are carried in `error` with
// `status` set to `error`, an empty `sql` and zero confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub sql: String,
    pub explanation: String,
    pub database: String,
    pub status: QueryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub confidence: f64,
}

impl GenerationResult {
    pub fn success(database: &str, sql: String, explanation: String, confidence: f64) -> Self {
        Self {
            sql,
            explanation,
            database: database.to_string(),
            status: QueryStatus::Success,
            error: None,
            confidence,
        }
    }

    pub fn failure(database: &str, error: impl Into<String>) -> Self {
        Self {
            sql: String::new(),
            explanation: String::new(),
            database: database.to_string(),
            status: QueryStatus::Error,
            error: Some(error.into()),
            confidence: 0.0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub sql: String,
    pub database: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: QueryStatus,
    pub rows_returned: usize,
    pub execution_time_ms: u64,
    pub message: String,
    pub data: Vec<serde_json::Value>,
}

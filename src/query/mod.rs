pub mod models;
pub mod safety;

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::db::executor::SimulatedExecutor;
use crate::db::schema_registry::{SchemaError, SchemaRegistry};
use crate::llm::{GeneratedSql, LlmError, LlmManager};
use models::{ExecutionRequest, ExecutionResult, GenerationRequest, GenerationResult};

#[derive(Debug)]
pub enum QueryError {
    UnsupportedDatabase(String),
    EmptyQuestion,
    Completion(LlmError),
    UnsafeQuery,
    InvalidLimit,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::UnsupportedDatabase(name) => write!(f, "Database '{}' not supported", name),
            QueryError::EmptyQuestion => write!(f, "Question must not be empty"),
            QueryError::Completion(e) => write!(f, "LLM API Error: {}", e),
            QueryError::UnsafeQuery => write!(f, "Invalid or unsafe SQL query"),
            QueryError::InvalidLimit => write!(f, "Limit must be a positive integer"),
        }
    }
}

impl Error for QueryError {}

impl From<SchemaError> for QueryError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::NotFound(name) => QueryError::UnsupportedDatabase(name),
        }
    }
}

impl From<LlmError> for QueryError {
    fn from(err: LlmError) -> Self {
        QueryError::Completion(err)
    }
}

/// Turns questions into SQL and gates SQL before simulated execution.
///
/// Holds no per-request state; one instance is shared by every handler.
#[derive(Clone)]
pub struct QueryService {
    registry: Arc<SchemaRegistry>,
    llm: Arc<LlmManager>,
    executor: SimulatedExecutor,
}

impl QueryService {
    pub fn new(registry: Arc<SchemaRegistry>, llm: Arc<LlmManager>) -> Self {
        Self {
            registry,
            llm,
            executor: SimulatedExecutor::new(),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Never fails: every error is folded into a `GenerationResult` with
    /// `status` set to `error`.
    pub async fn generate_sql(&self, request: &GenerationRequest) -> GenerationResult {
        match self.try_generate(request).await {
            Ok(generated) => {
                info!("Generated SQL for {}: {}", request.database, generated.sql);
                GenerationResult::success(
                    &request.database,
                    generated.sql,
                    generated.explanation,
                    generated.confidence,
                )
            }
            Err(e) => {
                match &e {
                    QueryError::Completion(_) => error!("SQL generation failed: {}", e),
                    _ => warn!("SQL generation rejected: {}", e),
                }
                GenerationResult::failure(&request.database, e.to_string())
            }
        }
    }

    async fn try_generate(&self, request: &GenerationRequest) -> Result<GeneratedSql, QueryError> {
        if request.question.trim().is_empty() {
            return Err(QueryError::EmptyQuestion);
        }

        let schema = self.registry.lookup(&request.database)?;

        let generated = self
            .llm
            .generate_sql(
                &request.question,
                &request.database,
                schema,
                request.context.as_deref(),
            )
            .await?;

        Ok(generated)
    }

    pub fn execute_sql(&self, request: &ExecutionRequest) -> Result<ExecutionResult, QueryError> {
        if !safety::is_safe(&request.sql) {
            warn!("Rejected unsafe query for {}: {}", request.database, request.sql);
            return Err(QueryError::UnsafeQuery);
        }

        if request.limit == 0 {
            return Err(QueryError::InvalidLimit);
        }

        Ok(self
            .executor
            .execute(&request.sql, &request.database, request.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::PLACEHOLDER_CONFIDENCE;
    use crate::llm::testing::{FixedReply, Unreachable};
    use models::QueryStatus;

    fn service_with(generator: Box<dyn crate::llm::SqlGenerator>) -> QueryService {
        QueryService::new(
            Arc::new(SchemaRegistry::builtin()),
            Arc::new(LlmManager::with_generator(generator, "test-model")),
        )
    }

    fn request(question: &str, database: &str) -> GenerationRequest {
        GenerationRequest {
            question: question.to_string(),
            database: database.to_string(),
            context: None,
        }
    }

    fn assert_well_formed(result: &GenerationResult) {
        match result.status {
            QueryStatus::Success => assert!(result.error.is_none()),
            QueryStatus::Error => {
                assert_eq!(result.sql, "");
                assert_eq!(result.confidence, 0.0);
                assert!(result.error.is_some());
            }
        }
        assert!((0.0..=1.0).contains(&result.confidence));
    }

    #[tokio::test]
    async fn generates_sql_for_known_database() {
        let sql = "SELECT * FROM EMPLOYEES WHERE department_id = (SELECT department_id FROM DEPARTMENTS WHERE department_name = 'Sales')";
        let service = service_with(Box::new(FixedReply::new(sql)));

        let result = service
            .generate_sql(&request("Show me all employees in Sales", "HR"))
            .await;

        assert_eq!(result.status, QueryStatus::Success);
        assert_eq!(result.sql, sql);
        assert_eq!(result.confidence, PLACEHOLDER_CONFIDENCE);
        assert_eq!(result.database, "HR");
        assert!(result.explanation.contains("HR"));
        assert_well_formed(&result);
    }

    #[tokio::test]
    async fn unknown_database_is_embedded_error() {
        let service = service_with(Box::new(FixedReply::new("SELECT 1")));

        let result = service.generate_sql(&request("anything", "UNKNOWN")).await;

        assert_eq!(result.status, QueryStatus::Error);
        assert!(result.error.as_deref().unwrap().contains("UNKNOWN"));
        assert_eq!(result.sql, "");
        assert_eq!(result.confidence, 0.0);
        assert_well_formed(&result);
    }

    #[tokio::test]
    async fn completion_failure_is_embedded_error() {
        let service = service_with(Box::new(Unreachable));

        let result = service.generate_sql(&request("List songs", "MUSIC")).await;

        assert_eq!(result.status, QueryStatus::Error);
        let error = result.error.as_deref().unwrap();
        assert!(error.starts_with("LLM API Error:"));
        assert!(error.contains("connection refused"));
        assert_well_formed(&result);
    }

    #[tokio::test]
    async fn blank_question_is_embedded_error() {
        let service = service_with(Box::new(FixedReply::new("SELECT 1")));
        let result = service.generate_sql(&request("   ", "HR")).await;
        assert_eq!(result.status, QueryStatus::Error);
        assert_well_formed(&result);
    }

    #[test]
    fn unsafe_sql_is_rejected() {
        let service = service_with(Box::new(Unreachable));
        let err = service
            .execute_sql(&ExecutionRequest {
                sql: "DROP TABLE EMPLOYEES".to_string(),
                database: "HR".to_string(),
                limit: 1000,
            })
            .unwrap_err();
        assert!(matches!(err, QueryError::UnsafeQuery));
        assert!(err.to_string().contains("unsafe"));
    }

    #[test]
    fn safe_sql_returns_simulated_result() {
        let service = service_with(Box::new(Unreachable));
        let result = service
            .execute_sql(&ExecutionRequest {
                sql: "SELECT * FROM EMPLOYEES".to_string(),
                database: "HR".to_string(),
                limit: 1000,
            })
            .unwrap();
        assert_eq!(result.status, QueryStatus::Success);
        assert_eq!(result.rows_returned, 0);
        assert!(result.data.is_empty());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let service = service_with(Box::new(Unreachable));
        let err = service
            .execute_sql(&ExecutionRequest {
                sql: "SELECT 1".to_string(),
                database: "HR".to_string(),
                limit: 0,
            })
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidLimit));
    }
}

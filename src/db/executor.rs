use crate::query::models::{ExecutionResult, QueryStatus};
use tracing::info;

/// Latency reported for every simulated execution.
pub const SIMULATED_EXECUTION_TIME_MS: u64 = 145;

pub const SIMULATED_MESSAGE: &str =
    "Query execution simulated (set up database connection for real execution)";

/// Stands in for a real database connection. No query is ever run; every
/// call reports success with zero rows.
#[derive(Debug, Default, Clone)]
pub struct SimulatedExecutor;

impl SimulatedExecutor {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, sql: &str, database: &str, limit: u32) -> ExecutionResult {
        info!(
            "Simulating execution against '{}' (limit {}): {}",
            database, limit, sql
        );

        ExecutionResult {
            status: QueryStatus::Success,
            rows_returned: 0,
            execution_time_ms: SIMULATED_EXECUTION_TIME_MS,
            message: SIMULATED_MESSAGE.to_string(),
            data: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_result_is_empty_success() {
        let result = SimulatedExecutor::new().execute("SELECT 1", "HR", 10);
        assert_eq!(result.status, QueryStatus::Success);
        assert_eq!(result.rows_returned, 0);
        assert_eq!(result.execution_time_ms, SIMULATED_EXECUTION_TIME_MS);
        assert!(result.data.is_empty());
        assert!(result.message.contains("simulated"));
    }
}

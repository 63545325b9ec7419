//! Query execution tool.
//!
//! Implements the `run_sql` MCP tool for read-only statements. Writes
//! (INSERT, UPDATE, DELETE, DDL) are blocked with clear error messages
//! before the database is contacted.

use crate::db::{QueryExecutor, SessionManager};
use crate::error::{Db2Error, Db2Result};
use crate::models::QueryResult;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the run_sql tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RunSqlInput {
    /// Read-only SQL statement (SELECT, WITH, or VALUES). Write operations are rejected.
    pub sql: String,
}

/// Handler for the run_sql tool.
pub struct QueryToolHandler {
    executor: QueryExecutor,
}

impl QueryToolHandler {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            executor: QueryExecutor::new(session),
        }
    }

    /// Execute a read-only statement and return the full result set.
    pub async fn run(&self, input: RunSqlInput) -> Db2Result<QueryResult> {
        let sql = input.sql.trim().to_string();
        if sql.is_empty() {
            return Err(Db2Error::write_not_allowed("empty statement"));
        }

        let result = self.executor.run(sql).await?;
        info!(
            rows = result.row_count,
            elapsed_ms = result.execution_time_ms,
            "run_sql succeeded"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockDriver;
    use crate::models::{ConnectionSpec, Scalar};

    async fn handler_with(driver: MockDriver) -> QueryToolHandler {
        let session = Arc::new(SessionManager::new(Arc::new(driver)));
        session
            .connect(&ConnectionSpec::new("h", "50000", "SAMPLE", "u", "p"))
            .await
            .unwrap();
        QueryToolHandler::new(session)
    }

    #[tokio::test]
    async fn test_run_sql_trims_input() {
        let driver = MockDriver::new();
        driver.script_query(
            "SELECT 1 FROM SYSIBM.SYSDUMMY1",
            vec!["1".to_string()],
            vec![vec![Scalar::Int(1)]],
        );
        let handler = handler_with(driver).await;

        let result = handler
            .run(RunSqlInput {
                sql: "  SELECT 1 FROM SYSIBM.SYSDUMMY1  ".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(result.rows, vec![vec![Scalar::Int(1)]]);
    }

    #[tokio::test]
    async fn test_run_sql_blocks_writes() {
        let driver = MockDriver::new();
        let handler = handler_with(driver.clone()).await;

        let err = handler
            .run(RunSqlInput {
                sql: "UPDATE T SET A = 1".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Db2Error::WriteNotAllowed { .. }));
        assert!(driver.statements_executed().is_empty());
    }

    #[tokio::test]
    async fn test_run_sql_rejects_empty() {
        let handler = handler_with(MockDriver::new()).await;
        let err = handler
            .run(RunSqlInput {
                sql: "   ".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Db2Error::WriteNotAllowed { .. }));
    }
}

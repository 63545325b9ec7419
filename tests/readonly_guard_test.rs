//! Integration tests for read-only enforcement.
//!
//! These tests verify that run_sql rejects write operations before the
//! driver is contacted and allows read-only statements through.

use db2_mcp_server::db::{MockDriver, SessionManager};
use db2_mcp_server::error::Db2Error;
use db2_mcp_server::models::{ConnectionSpec, Scalar};
use db2_mcp_server::tools::guard::ensure_readonly;
use db2_mcp_server::tools::{QueryToolHandler, RunSqlInput};
use std::sync::Arc;

fn spec() -> ConnectionSpec {
    ConnectionSpec::new("db2host", "50000", "SAMPLE", "db2inst1", "secret")
}

async fn connected_handler(driver: &MockDriver) -> QueryToolHandler {
    let session = Arc::new(SessionManager::new(Arc::new(driver.clone())));
    session.connect(&spec()).await.unwrap();
    QueryToolHandler::new(session)
}

/// Test that DELETE is rejected with WriteNotAllowed.
#[test]
fn test_guard_rejects_delete() {
    let result = ensure_readonly("DELETE FROM STAFF WHERE ID = 10");
    assert!(result.is_err(), "DELETE should be rejected");

    let err = result.unwrap_err();
    assert!(
        matches!(err, Db2Error::WriteNotAllowed { .. }),
        "Should be WriteNotAllowed error, got: {:?}",
        err
    );
}

/// Test that UPDATE and INSERT are rejected with WriteNotAllowed.
#[test]
fn test_guard_rejects_dml_writes() {
    for sql in [
        "INSERT INTO STAFF (ID) VALUES (1)",
        "UPDATE STAFF SET NAME = 'changed' WHERE ID = 1",
        "MERGE INTO STAFF USING NEW_STAFF ON (STAFF.ID = NEW_STAFF.ID) WHEN MATCHED THEN UPDATE SET NAME = NEW_STAFF.NAME",
    ] {
        let err = ensure_readonly(sql).unwrap_err();
        assert!(matches!(err, Db2Error::WriteNotAllowed { .. }), "{}", sql);
    }
}

/// Test that DDL is rejected with WriteNotAllowed.
#[test]
fn test_guard_rejects_ddl() {
    for sql in [
        "CREATE TABLE T (ID INT)",
        "DROP TABLE STAFF",
        "ALTER TABLE STAFF ADD COLUMN X INT",
        "TRUNCATE TABLE STAFF",
    ] {
        let err = ensure_readonly(sql).unwrap_err();
        assert!(matches!(err, Db2Error::WriteNotAllowed { .. }), "{}", sql);
    }
}

/// Test that SELECT, WITH, and VALUES pass.
#[test]
fn test_guard_allows_reads() {
    for sql in [
        "SELECT * FROM STAFF",
        "select id from staff where dept = 20",
        "WITH top AS (SELECT ID FROM STAFF) SELECT * FROM top",
        "VALUES (1, 'a')",
    ] {
        assert!(ensure_readonly(sql).is_ok(), "{}", sql);
    }
}

/// Test that the rejection message names the operation.
#[test]
fn test_rejection_names_operation() {
    let err = ensure_readonly("DROP TABLE STAFF").unwrap_err();
    assert!(err.to_string().contains("DROP"), "got: {}", err);
}

/// Test that a rejected statement never reaches the driver.
#[tokio::test]
async fn test_rejected_statement_never_reaches_driver() {
    let driver = MockDriver::new();
    let handler = connected_handler(&driver).await;

    let err = handler
        .run(RunSqlInput {
            sql: "DELETE FROM T".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Db2Error::WriteNotAllowed { .. }));
    assert!(
        driver.statements_executed().is_empty(),
        "driver must not be contacted for rejected statements"
    );
}

/// Test the canonical smoke query end to end through the tool handler.
#[tokio::test]
async fn test_sysdummy1_smoke_query() {
    let driver = MockDriver::new();
    driver.script_query(
        "SELECT 1 FROM SYSIBM.SYSDUMMY1",
        vec!["1".to_string()],
        vec![vec![Scalar::Int(1)]],
    );
    let handler = connected_handler(&driver).await;

    let result = handler
        .run(RunSqlInput {
            sql: "SELECT 1 FROM SYSIBM.SYSDUMMY1".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(result.columns.len(), 1);
    assert_eq!(result.row_count, 1);
    assert_eq!(result.rows, vec![vec![Scalar::Int(1)]]);
}

/// Test that a driver error surfaces as Query with the SQLSTATE.
#[tokio::test]
async fn test_query_error_surfaces_sqlstate() {
    use db2_mcp_server::db::DriverError;

    let driver = MockDriver::new();
    driver.script_query_error(
        "SELECT * FROM MISSING",
        DriverError::new("\"MISSING\" is an undefined name", Some("42704".to_string())),
    );
    let handler = connected_handler(&driver).await;

    let err = handler
        .run(RunSqlInput {
            sql: "SELECT * FROM MISSING".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        Db2Error::Query { sqlstate, .. } => assert_eq!(sqlstate.as_deref(), Some("42704")),
        other => panic!("expected Query error, got {:?}", other),
    }
}

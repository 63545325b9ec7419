//! Integration tests for session lifecycle.
//!
//! These tests cover the single-session model: connect, reconnect,
//! precondition failures, and dead-connection handling.

use db2_mcp_server::db::{DriverError, MockDriver, QueryExecutor, SessionManager};
use db2_mcp_server::error::Db2Error;
use db2_mcp_server::models::{ConnectionSpec, Scalar};
use std::sync::Arc;

fn spec() -> ConnectionSpec {
    ConnectionSpec::new("db2host", "50000", "SAMPLE", "db2inst1", "secret")
}

/// Test that tools fail with NotConnected before any connect_db call.
#[tokio::test]
async fn test_query_before_connect_fails() {
    let session = Arc::new(SessionManager::new(Arc::new(MockDriver::new())));
    let executor = QueryExecutor::new(session);

    let err = executor
        .run("SELECT 1 FROM SYSIBM.SYSDUMMY1".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, Db2Error::NotConnected));
    assert!(err.to_string().contains("connect_db"));
}

/// Test that the missing session is reported for any SQL, even statements
/// the read-only guard would reject on a connected session.
#[tokio::test]
async fn test_write_before_connect_still_reports_not_connected() {
    let driver = MockDriver::new();
    let session = Arc::new(SessionManager::new(Arc::new(driver.clone())));
    let executor = QueryExecutor::new(session);

    let err = executor.run("DELETE FROM T".to_string()).await.unwrap_err();
    assert!(matches!(err, Db2Error::NotConnected));
    assert!(driver.statements_executed().is_empty());
}

/// Test that reconnecting leaves exactly one live session.
#[tokio::test]
async fn test_double_connect_keeps_single_session() {
    let driver = Arc::new(MockDriver::new());
    let manager = SessionManager::new(driver.clone());

    manager.connect(&spec()).await.unwrap();
    manager.connect(&spec()).await.unwrap();
    manager.connect(&spec()).await.unwrap();

    assert_eq!(driver.connections_opened(), 3);
    assert_eq!(driver.connections_closed(), 2);
    assert!(manager.is_connected());
}

/// Test that a failed connect leaves the previous state disconnected.
#[tokio::test]
async fn test_refused_connect_stays_disconnected() {
    let driver = MockDriver::new();
    driver.refuse_connections("SQL30081N A communication error has been detected");
    let manager = SessionManager::new(Arc::new(driver));

    let err = manager.connect(&spec()).await.unwrap_err();
    assert!(matches!(err, Db2Error::Connect { .. }));
    assert!(err.to_string().contains("SQL30081N"));
    assert!(!manager.is_connected());
}

/// Test that connect errors never contain the password.
#[tokio::test]
async fn test_connect_error_redacts_credentials() {
    let driver = MockDriver::new();
    driver.refuse_connections("SQL30082N Security processing failed with reason 24");
    let manager = SessionManager::new(Arc::new(driver));

    let err = manager.connect(&spec()).await.unwrap_err();
    assert!(!err.to_string().contains("secret"));
    assert!(!err.to_string().contains("db2inst1"));
}

/// Test that a connection-class failure drops the session and later calls
/// fail fast until reconnect.
#[tokio::test]
async fn test_connection_loss_requires_reconnect() {
    let driver = Arc::new(MockDriver::new());
    driver.script_query_error(
        "SELECT ID FROM STAFF",
        DriverError::new("connection is closed", Some("08003".to_string())),
    );
    let manager = Arc::new(SessionManager::new(driver.clone()));
    manager.connect(&spec()).await.unwrap();

    let executor = QueryExecutor::new(manager.clone());
    let err = executor
        .run("SELECT ID FROM STAFF".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, Db2Error::Query { .. }));
    assert!(!manager.is_connected());

    // Fails fast now.
    let err = executor
        .run("SELECT ID FROM STAFF".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, Db2Error::NotConnected));

    // Reconnect restores service.
    driver.script_query(
        "SELECT ID FROM STAFF",
        vec!["ID".to_string()],
        vec![vec![Scalar::Int(10)]],
    );
    manager.connect(&spec()).await.unwrap();
    let result = executor.run("SELECT ID FROM STAFF".to_string()).await.unwrap();
    assert_eq!(result.row_count, 1);
}

/// Test that a plain statement error keeps the session usable.
#[tokio::test]
async fn test_statement_error_keeps_session_alive() {
    let driver = Arc::new(MockDriver::new());
    driver.script_query_error(
        "SELECT BAD FROM STAFF",
        DriverError::new("\"BAD\" is not valid in the context", Some("42703".to_string())),
    );
    let manager = Arc::new(SessionManager::new(driver));
    manager.connect(&spec()).await.unwrap();

    let executor = QueryExecutor::new(manager.clone());
    let err = executor
        .run("SELECT BAD FROM STAFF".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, Db2Error::Query { .. }));
    assert!(manager.is_connected());
}

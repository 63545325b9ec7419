//! Driver boundary for DB2 access.
//!
//! The session manager, query executor, and procedure invoker talk to the
//! database exclusively through these traits. The real backend is the ODBC
//! CLI driver (`odbc` feature); tests use the in-memory mock driver.
//!
//! Driver operations are blocking by contract. Callers are expected to run
//! them on a blocking thread (the session manager does this) and must never
//! share a connection across threads without serializing access.

use crate::models::{ConnectionSpec, QueryResult, ResolvedParam, Scalar};

/// Error reported by a driver backend.
///
/// Carries the driver diagnostic verbatim plus the SQLSTATE when available.
/// `connection_dead` marks failures after which the connection handle is no
/// longer usable; the session manager drops the session in that case.
#[derive(Debug, Clone)]
pub struct DriverError {
    message: String,
    sqlstate: Option<String>,
    connection_dead: bool,
}

impl DriverError {
    /// Create a driver error.
    pub fn new(message: impl Into<String>, sqlstate: Option<String>) -> Self {
        let sqlstate = sqlstate.filter(|s| !s.is_empty());
        // SQLSTATE class 08 covers connection exceptions.
        let connection_dead = sqlstate
            .as_deref()
            .is_some_and(|state| state.starts_with("08"));
        Self {
            message: message.into(),
            sqlstate,
            connection_dead,
        }
    }

    /// Mark this error as fatal to the connection regardless of SQLSTATE.
    pub fn fatal(mut self) -> Self {
        self.connection_dead = true;
        self
    }

    /// The driver diagnostic message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The SQLSTATE, if the driver reported one.
    pub fn sqlstate(&self) -> Option<&str> {
        self.sqlstate.as_deref()
    }

    /// Whether the connection is unusable after this error.
    pub fn is_connection_dead(&self) -> bool {
        self.connection_dead
    }
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sqlstate {
            Some(state) => write!(f, "{} (SQLSTATE {})", self.message, state),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for DriverError {}

/// A fully fetched result set as the driver produced it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResultSet {
    /// Column names in driver-reported order.
    pub columns: Vec<String>,
    /// All rows, fetched eagerly, in natural fetch order.
    pub rows: Vec<Vec<Scalar>>,
}

impl RawResultSet {
    /// Convert into the transport-facing result shape.
    pub fn into_query_result(self, execution_time_ms: u64) -> QueryResult {
        QueryResult::new(self.columns, self.rows, execution_time_ms)
    }
}

/// Everything a stored procedure call produced.
///
/// Backends collect result sets first, in the order the driver exposes them,
/// and read output parameters afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCallOutcome {
    /// Result sets in driver order.
    pub result_sets: Vec<RawResultSet>,
    /// Out/inout parameter values in declaration order.
    pub output_values: Vec<Scalar>,
}

/// Factory for DB2 connections.
pub trait Db2Driver: Send + Sync {
    /// Open a connection for the given spec.
    ///
    /// Implementations must not embed credentials in error messages.
    fn connect(&self, spec: &ConnectionSpec) -> Result<Box<dyn Db2Connection>, DriverError>;
}

/// One live DB2 connection handle.
pub trait Db2Connection: Send {
    /// Execute a statement and fetch its full result set.
    ///
    /// Statements without a result set yield an empty [`RawResultSet`].
    fn execute_query(&mut self, sql: &str) -> Result<RawResultSet, DriverError>;

    /// Execute `CALL name(?, ...)` with the given resolved parameters.
    fn call_procedure(
        &mut self,
        name: &str,
        params: &[ResolvedParam],
    ) -> Result<RawCallOutcome, DriverError>;

    /// Best-effort close; errors from an already-broken handle are swallowed.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_exception_sqlstate_marks_dead() {
        let err = DriverError::new("connection reset", Some("08003".to_string()));
        assert!(err.is_connection_dead());
    }

    #[test]
    fn test_statement_error_keeps_connection() {
        let err = DriverError::new("syntax error", Some("42601".to_string()));
        assert!(!err.is_connection_dead());
    }

    #[test]
    fn test_fatal_overrides_sqlstate() {
        let err = DriverError::new("driver panic", None).fatal();
        assert!(err.is_connection_dead());
    }

    #[test]
    fn test_display_includes_sqlstate() {
        let err = DriverError::new("bad table", Some("42704".to_string()));
        assert_eq!(err.to_string(), "bad table (SQLSTATE 42704)");
    }

    #[test]
    fn test_empty_sqlstate_treated_as_absent() {
        let err = DriverError::new("boom", Some(String::new()));
        assert_eq!(err.sqlstate(), None);
    }
}

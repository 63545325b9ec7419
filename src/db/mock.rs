//! In-memory driver backend with scripted responses.
//!
//! Lets the session manager, executor, and invoker be exercised without a
//! DB2 instance: tests script responses per statement or procedure name,
//! inject failures, and inspect what actually reached the driver.

use crate::db::driver::{
    Db2Connection, Db2Driver, DriverError, RawCallOutcome, RawResultSet,
};
use crate::models::{ConnectionSpec, ResolvedParam, Scalar};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Default)]
struct MockState {
    refuse_with: Option<String>,
    queries: HashMap<String, Result<RawResultSet, DriverError>>,
    procedures: HashMap<String, Result<RawCallOutcome, DriverError>>,
    opened: usize,
    closed: usize,
    journal: Vec<String>,
}

/// Scripted driver backend for tests and offline development.
#[derive(Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    /// Create a driver with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent connect attempt fail with the given diagnostic.
    pub fn refuse_connections(&self, message: impl Into<String>) {
        self.lock().refuse_with = Some(message.into());
    }

    /// Script a successful result set for an exact SQL text.
    pub fn script_query(&self, sql: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Scalar>>) {
        self.lock()
            .queries
            .insert(sql.into(), Ok(RawResultSet { columns, rows }));
    }

    /// Script a driver failure for an exact SQL text.
    pub fn script_query_error(&self, sql: impl Into<String>, error: DriverError) {
        self.lock().queries.insert(sql.into(), Err(error));
    }

    /// Script a successful outcome for a procedure name.
    pub fn script_procedure(&self, name: impl Into<String>, outcome: RawCallOutcome) {
        self.lock().procedures.insert(name.into(), Ok(outcome));
    }

    /// Script a driver failure for a procedure name.
    pub fn script_procedure_error(&self, name: impl Into<String>, error: DriverError) {
        self.lock().procedures.insert(name.into(), Err(error));
    }

    /// Number of connections handed out so far.
    pub fn connections_opened(&self) -> usize {
        self.lock().opened
    }

    /// Number of connections closed so far.
    pub fn connections_closed(&self) -> usize {
        self.lock().closed
    }

    /// Every statement and call that reached the driver, in order.
    pub fn statements_executed(&self) -> Vec<String> {
        self.lock().journal.clone()
    }
}

impl Db2Driver for MockDriver {
    fn connect(&self, _spec: &ConnectionSpec) -> Result<Box<dyn Db2Connection>, DriverError> {
        let mut state = self.lock();
        if let Some(message) = &state.refuse_with {
            return Err(DriverError::new(message.clone(), Some("08001".to_string())));
        }
        state.opened += 1;
        Ok(Box::new(MockConnection {
            state: Arc::clone(&self.state),
            closed: false,
        }))
    }
}

struct MockConnection {
    state: Arc<Mutex<MockState>>,
    closed: bool,
}

impl MockConnection {
    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Db2Connection for MockConnection {
    fn execute_query(&mut self, sql: &str) -> Result<RawResultSet, DriverError> {
        let mut state = self.lock();
        state.journal.push(sql.to_string());
        match state.queries.get(sql) {
            Some(result) => result.clone(),
            None => Err(DriverError::new(
                format!("no scripted response for statement: {}", sql),
                Some("42704".to_string()),
            )),
        }
    }

    fn call_procedure(
        &mut self,
        name: &str,
        params: &[ResolvedParam],
    ) -> Result<RawCallOutcome, DriverError> {
        let mut state = self.lock();
        state
            .journal
            .push(format!("CALL {} [{} params]", name, params.len()));
        match state.procedures.get(name) {
            Some(result) => result.clone(),
            None => Err(DriverError::new(
                format!("\"{}\" is an undefined name", name),
                Some("42884".to_string()),
            )),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.lock().closed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ConnectionSpec {
        ConnectionSpec::new("h", "1", "D", "u", "p")
    }

    #[test]
    fn test_scripted_query_round_trip() {
        let driver = MockDriver::new();
        driver.script_query(
            "SELECT 1 FROM SYSIBM.SYSDUMMY1",
            vec!["1".to_string()],
            vec![vec![Scalar::Int(1)]],
        );

        let mut conn = driver.connect(&spec()).unwrap();
        let raw = conn.execute_query("SELECT 1 FROM SYSIBM.SYSDUMMY1").unwrap();
        assert_eq!(raw.columns, vec!["1".to_string()]);
        assert_eq!(raw.rows, vec![vec![Scalar::Int(1)]]);
    }

    #[test]
    fn test_unscripted_statement_fails_with_sqlstate() {
        let driver = MockDriver::new();
        let mut conn = driver.connect(&spec()).unwrap();
        let err = conn.execute_query("SELECT * FROM NOWHERE").unwrap_err();
        assert_eq!(err.sqlstate(), Some("42704"));
    }

    #[test]
    fn test_journal_records_calls() {
        let driver = MockDriver::new();
        let mut conn = driver.connect(&spec()).unwrap();
        let _ = conn.call_procedure("MYPROC", &[]);
        assert_eq!(
            driver.statements_executed(),
            vec!["CALL MYPROC [0 params]".to_string()]
        );
    }

    #[test]
    fn test_double_close_counts_once() {
        let driver = MockDriver::new();
        let mut conn = driver.connect(&spec()).unwrap();
        conn.close();
        conn.close();
        assert_eq!(driver.connections_closed(), 1);
    }
}

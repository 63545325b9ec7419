//! Database access layer.
//!
//! This module provides DB2 access functionality:
//! - Driver boundary traits plus the ODBC and mock backends
//! - Session lifecycle management
//! - Read-only query execution
//! - Stored procedure invocation

pub mod driver;
pub mod executor;
pub mod mock;
#[cfg(feature = "odbc")]
pub mod odbc;
pub mod procedures;
pub mod session;

pub use driver::{Db2Connection, Db2Driver, DriverError, RawCallOutcome, RawResultSet};
pub use executor::QueryExecutor;
pub use mock::MockDriver;
#[cfg(feature = "odbc")]
pub use odbc::OdbcDriver;
pub use procedures::ProcedureInvoker;
pub use session::SessionManager;

//! MCP tool implementations.
//!
//! This module contains the DB2 tool handlers:
//! - `connect_db`: Establish the database session from environment credentials
//! - `run_sql`: Execute read-only SQL statements
//! - `call_sp`: Call stored procedures with in/out/inout parameters
//! - `guard`: Read-only statement enforcement for run_sql

pub mod connect;
pub mod guard;
pub mod procedure;
pub mod query;

pub use connect::{ConnectOutput, ConnectToolHandler};
pub use procedure::{CallSpInput, CallSpOutput, ProcedureToolHandler};
pub use query::{QueryToolHandler, RunSqlInput};

//! Data models for the DB2 MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod procedure;
pub mod query;

// Re-export commonly used types
pub use connection::{ConnectAck, ConnectionSpec};
pub use procedure::{
    ParamDirection, ParamType, ProcedureParamInput, ProcedureResult, ResolvedParam,
};
pub use query::{QueryResult, Scalar};

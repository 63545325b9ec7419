//! DB2 MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools for AI assistants
//! to interact with an IBM DB2 for LUW database: a single managed session,
//! read-only SQL execution, and stored procedure calls with out parameters.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{Db2Error, Db2Result};
pub use mcp::Db2Service;

//! Error types for the DB2 MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error
//! handling. Each variant carries an actionable message so AI assistants can
//! understand and recover from error conditions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Db2Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Connection failed: {message}")]
    Connect { message: String },

    #[error("Database connection not established. Call connect_db first.")]
    NotConnected,

    #[error("Write operations are not allowed in run_sql: {operation}")]
    WriteNotAllowed { operation: String },

    #[error("SQL execution error: {message}")]
    Query {
        message: String,
        /// e.g. "42601" for a syntax error
        sqlstate: Option<String>,
    },

    #[error("Stored procedure error: {message}")]
    Procedure {
        message: String,
        sqlstate: Option<String>,
    },

    #[error("Parameter binding error: {message}")]
    ParameterBinding { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl Db2Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a connection error. The message must never contain credentials.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Create a query error with an optional SQLSTATE.
    pub fn query(message: impl Into<String>, sqlstate: Option<String>) -> Self {
        Self::Query {
            message: message.into(),
            sqlstate,
        }
    }

    /// Create a stored procedure error with an optional SQLSTATE.
    pub fn procedure(message: impl Into<String>, sqlstate: Option<String>) -> Self {
        Self::Procedure {
            message: message.into(),
            sqlstate,
        }
    }

    /// Create a parameter binding error.
    pub fn parameter_binding(message: impl Into<String>) -> Self {
        Self::ParameterBinding {
            message: message.into(),
        }
    }

    /// Create a write-not-allowed error for the given statement kind.
    pub fn write_not_allowed(operation: impl Into<String>) -> Self {
        Self::WriteNotAllowed {
            operation: operation.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The SQLSTATE reported by the driver, if any.
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            Self::Query { sqlstate, .. } | Self::Procedure { sqlstate, .. } => sqlstate.as_deref(),
            _ => None,
        }
    }

    /// Whether this error means the statement was never sent to the driver.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::NotConnected
                | Self::WriteNotAllowed { .. }
                | Self::ParameterBinding { .. }
        )
    }
}

/// Result type alias for database operations.
pub type Db2Result<T> = Result<T, Db2Error>;

/// Build suggestion data as a JSON value.
fn suggestion_data(suggestion: &str) -> Option<serde_json::Value> {
    Some(serde_json::json!({ "suggestion": suggestion }))
}

/// Convert Db2Error to MCP ErrorData for semantic error categorization.
///
/// Caller mistakes (bad config, bad SQL, bad parameters, no session) map to
/// invalid_params; driver and infrastructure failures map to internal_error.
impl From<Db2Error> for rmcp::ErrorData {
    fn from(err: Db2Error) -> Self {
        match &err {
            Db2Error::Config { .. } => rmcp::ErrorData::invalid_params(
                err.to_string(),
                suggestion_data(
                    "Set DB2_DATABASE, DB2_HOSTNAME, DB2_PORT, DB2_USERNAME and DB2_PASSWORD",
                ),
            ),
            Db2Error::NotConnected => rmcp::ErrorData::invalid_params(
                err.to_string(),
                suggestion_data("Call connect_db before run_sql or call_sp"),
            ),
            Db2Error::WriteNotAllowed { .. } => rmcp::ErrorData::invalid_params(
                err.to_string(),
                suggestion_data("run_sql only executes read-only statements (SELECT/WITH/VALUES)"),
            ),
            Db2Error::ParameterBinding { .. } => rmcp::ErrorData::invalid_params(
                err.to_string(),
                suggestion_data("Check parameter count, types and directions against the procedure signature"),
            ),

            Db2Error::Connect { .. } => rmcp::ErrorData::internal_error(
                err.to_string(),
                suggestion_data("Verify host, port and credentials, then retry connect_db"),
            ),

            // Driver-reported statement failures keep the SQLSTATE in the message.
            Db2Error::Query { message, sqlstate } | Db2Error::Procedure { message, sqlstate } => {
                let msg = match sqlstate {
                    Some(code) => format!("{} (SQLSTATE: {})", message, code),
                    None => message.clone(),
                };
                rmcp::ErrorData::invalid_params(msg, None)
            }

            Db2Error::Internal { .. } => rmcp::ErrorData::internal_error(err.to_string(), None),
        }
    }
}

//! Connection tool.
//!
//! Implements the `connect_db` MCP tool. Credentials are taken from the
//! `DB2_*` environment variables of the server process, never from the
//! client; the tool takes no arguments and the response never echoes the
//! password.

use crate::db::SessionManager;
use crate::error::Db2Result;
use crate::models::{ConnectAck, ConnectionSpec};
use schemars::JsonSchema;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Output from the connect_db tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ConnectOutput {
    /// Always "connected" on success
    pub status: String,
    /// Human-readable confirmation
    pub message: String,
    /// Database name the session is attached to
    pub database: String,
    /// Database server host
    pub host: String,
    /// Database server port
    pub port: String,
}

impl From<ConnectAck> for ConnectOutput {
    fn from(ack: ConnectAck) -> Self {
        Self {
            status: "connected".to_string(),
            message: ack.message,
            database: ack.database,
            host: ack.host,
            port: ack.port,
        }
    }
}

/// Handler for the connect_db tool.
pub struct ConnectToolHandler {
    session: Arc<SessionManager>,
}

impl ConnectToolHandler {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Open (or replace) the database session from environment credentials.
    pub async fn connect(&self) -> Db2Result<ConnectOutput> {
        let spec = ConnectionSpec::from_env();
        let ack = self.session.connect(&spec).await?;
        info!(database = %ack.database, "connect_db succeeded");
        Ok(ack.into())
    }
}

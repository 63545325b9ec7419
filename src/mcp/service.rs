//! MCP service implementation using rmcp.
//!
//! This module defines the Db2Service struct exposing the three DB2 tools
//! (connect_db, run_sql, call_sp) via the MCP protocol using the rmcp
//! framework's macros.

use crate::db::SessionManager;
use crate::models::QueryResult;
use crate::tools::connect::{ConnectOutput, ConnectToolHandler};
use crate::tools::procedure::{CallSpInput, CallSpOutput, ProcedureToolHandler};
use crate::tools::query::{QueryToolHandler, RunSqlInput};
use rmcp::Json;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct Db2Service {
    /// Shared session manager for all database operations
    session: Arc<SessionManager>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl Db2Service {
    /// Create a new Db2Service instance over the shared session.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl Db2Service {
    #[tool(
        description = "Connect to the DB2 database using the server's DB2_* environment variables.\nTakes no arguments; credentials never come from the client.\nReconnecting replaces the previous session."
    )]
    async fn connect_db(&self) -> Result<Json<ConnectOutput>, McpError> {
        let handler = ConnectToolHandler::new(self.session.clone());
        handler.connect().await.map(Json).map_err(McpError::from)
    }

    #[tool(
        description = "Execute a read-only SQL statement (SELECT, WITH, or VALUES) and return all rows.\nWrite operations (INSERT/UPDATE/DELETE/DDL) are rejected.\nRequires an established session: call connect_db first."
    )]
    async fn run_sql(
        &self,
        Parameters(input): Parameters<RunSqlInput>,
    ) -> Result<Json<QueryResult>, McpError> {
        let handler = QueryToolHandler::new(self.session.clone());
        handler.run(input).await.map(Json).map_err(McpError::from)
    }

    #[tool(
        description = "Call a stored procedure with positional parameters.\nA bare JSON scalar is an `in` parameter; use {\"value\": ..., \"direction\": \"in|out|inout\", \"type\": \"integer|float|text|boolean\"} for output parameters.\nReturns output parameter values and any result sets.\nRequires an established session: call connect_db first."
    )]
    async fn call_sp(
        &self,
        Parameters(input): Parameters<CallSpInput>,
    ) -> Result<Json<CallSpOutput>, McpError> {
        let handler = ProcedureToolHandler::new(self.session.clone());
        handler.call(input).await.map(Json).map_err(McpError::from)
    }
}

#[tool_handler]
impl ServerHandler for Db2Service {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "db2-mcp-server".to_owned(),
                title: Some("DB2 MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "DB2 for LUW database tools.\n\
                \n\
                ## Workflow\n\
                1. Call `connect_db` to establish the session (credentials come from the\n\
                   server's DB2_* environment variables)\n\
                2. Use `run_sql` for read-only statements (SELECT, WITH, VALUES)\n\
                3. Use `call_sp` for stored procedures, including ones with out parameters\n\
                \n\
                ## Error: Database connection not established\n\
                Call `connect_db` first. The same applies after the connection is lost;\n\
                reconnecting replaces the dead session.\n\
                \n\
                ## Writes\n\
                `run_sql` rejects INSERT/UPDATE/DELETE/DDL. Mutations are only possible\n\
                through stored procedures via `call_sp`."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockDriver;

    fn create_test_service() -> Db2Service {
        let session = Arc::new(SessionManager::new(Arc::new(MockDriver::new())));
        Db2Service::new(session)
    }

    #[test]
    fn test_service_creation() {
        let _service = create_test_service();
    }

    #[test]
    fn test_server_info() {
        let service = create_test_service();
        let info = service.get_info();
        assert_eq!(info.server_info.name, "db2-mcp-server");
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
    }
}

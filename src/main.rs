//! DB2 MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to interact with an IBM DB2 for LUW database: connect, run read-only SQL,
//! and call stored procedures.

use clap::Parser;
use db2_mcp_server::config::Config;
use db2_mcp_server::db::{OdbcDriver, SessionManager};
use db2_mcp_server::models::ConnectionSpec;
use db2_mcp_server::transport::{StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr; stdout belongs to the MCP protocol.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Attempt the startup connection without failing the process.
///
/// The session stays disconnected on failure and the client can still
/// establish it later through connect_db.
async fn eager_connect(session: &SessionManager) {
    let spec = ConnectionSpec::from_env();
    info!(target = %spec.location(), "Eagerly connecting to database");
    if let Err(e) = session.connect(&spec).await {
        warn!(error = %e, "Startup connection failed, continuing without a session");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    if config.enable_logs {
        init_tracing(&config);
    }

    info!("Starting DB2 MCP Server v{}", env!("CARGO_PKG_VERSION"));

    let session = Arc::new(SessionManager::new(Arc::new(OdbcDriver::new())));

    if config.eager_connect {
        eager_connect(&session).await;
    }

    let transport = StdioTransport::new(session);
    info!(transport = transport.name(), "Using stdio transport");

    if let Err(e) = transport.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use db2_mcp_server::db::MockDriver;
    use db2_mcp_server::models::connection::{
        ENV_DATABASE, ENV_HOSTNAME, ENV_PASSWORD, ENV_PORT, ENV_USERNAME,
    };

    #[tokio::test]
    async fn test_eager_connect_failure_keeps_server_alive() {
        unsafe {
            std::env::set_var(ENV_DATABASE, "SAMPLE");
            std::env::set_var(ENV_HOSTNAME, "db2host");
            std::env::set_var(ENV_PORT, "50000");
            std::env::set_var(ENV_USERNAME, "db2inst1");
            std::env::set_var(ENV_PASSWORD, "secret");
        }

        let driver = MockDriver::new();
        driver.refuse_connections("SQL30081N communication error");
        let session = SessionManager::new(Arc::new(driver));

        // No error escapes; the session simply stays unconnected so a
        // later connect_db call can open it.
        eager_connect(&session).await;
        assert!(!session.is_connected());
    }
}

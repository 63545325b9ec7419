//! Configuration handling for the DB2 MCP Server.
//!
//! This module provides configuration management via CLI arguments and
//! environment variables. Database credentials are not part of this
//! configuration; they come exclusively from the `DB2_*` environment
//! variables read at connect time.

use clap::Parser;

/// Configuration for the DB2 MCP Server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "db2-mcp-server",
    about = "MCP server for IBM DB2 - enables AI assistants to query databases and call stored procedures",
    version,
    author
)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,

    /// Enable logging output on stderr (disabled by default to keep the
    /// stdio transport clean)
    #[arg(long, env = "MCP_ENABLE_LOGS")]
    pub enable_logs: bool,

    /// Connect to the database at startup instead of waiting for the first
    /// connect_db call. A failed startup connection is logged and the
    /// server keeps running; connect_db can establish the session later.
    #[arg(long, env = "MCP_EAGER_CONNECT")]
    pub eager_connect: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            enable_logs: false,
            eager_connect: false,
        }
    }
}

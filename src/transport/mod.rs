//! Transport layer for the MCP server.
//!
//! The server speaks MCP over standard input/output, the standard mode for
//! CLI-based integrations. The trait keeps the seam open for other
//! transports without touching the service.

pub mod stdio;

pub use stdio::StdioTransport;

use crate::error::Db2Result;
use std::future::Future;

/// Trait for MCP transport implementations.
///
/// Transports handle the low-level communication between the MCP server
/// and clients, abstracting away the protocol details.
pub trait Transport: Send + Sync {
    /// Start the transport and begin handling requests.
    ///
    /// This method should block until the transport is shut down.
    fn run(&self) -> impl Future<Output = Db2Result<()>> + Send;

    /// Get the name of this transport for logging.
    fn name(&self) -> &'static str;
}

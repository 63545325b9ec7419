//! Read-only query execution.
//!
//! The executor runs SELECT/WITH/VALUES statements against the active
//! session. A missing session is reported before anything else; after
//! that the read-only guard runs, so rejected statements never reach the
//! driver. Results are fetched eagerly: column names in driver
//! order, then every row, with elapsed wall time recorded on the result.

use crate::db::session::SessionManager;
use crate::error::{Db2Error, Db2Result};
use crate::models::QueryResult;
use crate::tools::guard;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Executes read-only SQL against the shared session.
#[derive(Clone)]
pub struct QueryExecutor {
    session: Arc<SessionManager>,
}

impl QueryExecutor {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Run a read-only statement and collect the full result set.
    ///
    /// Fails with `NotConnected` if no session is established, with
    /// `WriteNotAllowed` before touching the driver if the statement is not
    /// SELECT/WITH/VALUES, and with `Query` (carrying the driver's SQLSTATE)
    /// if the database rejects the statement. The disconnected case wins
    /// over the guard so callers always see the missing session first.
    pub async fn run(&self, sql: String) -> Db2Result<QueryResult> {
        if !self.session.is_connected() {
            return Err(Db2Error::NotConnected);
        }
        guard::ensure_readonly(&sql)?;

        debug!(sql = %sql, "executing query");
        let started = Instant::now();

        let outcome = self
            .session
            .with_connection(move |conn| conn.execute_query(&sql))
            .await?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(raw) => {
                let result = raw.into_query_result(elapsed_ms);
                debug!(
                    rows = result.row_count,
                    columns = result.columns.len(),
                    elapsed_ms,
                    "query completed"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "query failed");
                Err(Db2Error::query(
                    e.message().to_string(),
                    e.sqlstate().map(String::from),
                ))
            }
        }
    }
}

//! Session lifecycle management.
//!
//! This module owns the single process-wide database session. The connection
//! handle lives behind a mutex and is only ever touched on blocking threads;
//! the mutex also serializes concurrent tool calls, since a DB2 connection is
//! not safe for concurrent use.

use crate::db::driver::{Db2Connection, Db2Driver, DriverError};
use crate::error::{Db2Error, Db2Result};
use crate::models::{ConnectAck, ConnectionSpec};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

type ConnectionSlot = Arc<Mutex<Option<Box<dyn Db2Connection>>>>;

/// Owner of the single active database session.
///
/// States: disconnected (slot empty) and connected (slot holds a handle).
/// Only this type mutates the slot; the executor and invoker borrow the
/// handle for the duration of one call via [`with_connection`].
///
/// [`with_connection`]: SessionManager::with_connection
#[derive(Clone)]
pub struct SessionManager {
    driver: Arc<dyn Db2Driver>,
    connection: ConnectionSlot,
}

impl SessionManager {
    /// Create a session manager over the given driver backend.
    pub fn new(driver: Arc<dyn Db2Driver>) -> Self {
        Self {
            driver,
            connection: Arc::new(Mutex::new(None)),
        }
    }

    /// Open a session for the given spec.
    ///
    /// Validates the credentials first, releases any previous connection, then asks
    /// the driver for a new handle. On driver refusal the session stays
    /// disconnected and the driver diagnostic is surfaced without
    /// credentials. Reconnecting is idempotent: after any number of calls at
    /// most one live handle exists.
    pub async fn connect(&self, spec: &ConnectionSpec) -> Db2Result<ConnectAck> {
        spec.validate()?;

        let driver = Arc::clone(&self.driver);
        let slot = Arc::clone(&self.connection);
        let spec = spec.clone();
        let location = spec.location();

        info!(target = %location, "Connecting to DB2");

        let ack = tokio::task::spawn_blocking(move || {
            let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

            if let Some(mut previous) = guard.take() {
                debug!("Releasing previous session before reconnect");
                previous.close();
            }

            match driver.connect(&spec) {
                Ok(handle) => {
                    *guard = Some(handle);
                    Ok(ConnectAck::for_spec(&spec))
                }
                Err(e) => Err(Db2Error::connect(e.to_string())),
            }
        })
        .await
        .map_err(join_error)??;

        info!(target = %location, "Connected");
        Ok(ack)
    }

    /// Best-effort close of the current session, if any.
    pub async fn disconnect(&self) {
        let slot = Arc::clone(&self.connection);
        let closed = tokio::task::spawn_blocking(move || {
            let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            match guard.take() {
                Some(mut handle) => {
                    handle.close();
                    true
                }
                None => false,
            }
        })
        .await
        .unwrap_or(false);

        if closed {
            info!("Session closed");
        }
    }

    /// Whether a session is currently open.
    pub fn is_connected(&self) -> bool {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Run one driver operation against the active session.
    ///
    /// Fails with [`Db2Error::NotConnected`] when no session is open; this
    /// never attempts an implicit reconnect. The operation runs on a blocking
    /// thread while holding the session lock, so concurrent tool calls are
    /// serialized.
    ///
    /// The outer error covers session-level failures; the inner result is
    /// the driver outcome, which the caller maps into its own error kind.
    /// When the driver reports the connection dead the handle is dropped, and
    /// subsequent calls fail with `NotConnected` until the caller reconnects.
    pub async fn with_connection<T, F>(&self, op: F) -> Db2Result<Result<T, DriverError>>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn Db2Connection) -> Result<T, DriverError> + Send + 'static,
    {
        let slot = Arc::clone(&self.connection);

        tokio::task::spawn_blocking(move || {
            let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            let handle = guard.as_deref_mut().ok_or(Db2Error::NotConnected)?;

            match op(handle) {
                Ok(value) => Ok(Ok(value)),
                Err(e) if e.is_connection_dead() => {
                    warn!(error = %e, "Driver reported connection dead, dropping session");
                    if let Some(mut broken) = guard.take() {
                        broken.close();
                    }
                    Ok(Err(e))
                }
                Err(e) => Ok(Err(e)),
            }
        })
        .await
        .map_err(join_error)?
    }
}

fn join_error(e: tokio::task::JoinError) -> Db2Error {
    Db2Error::internal(format!("Blocking database task failed: {}", e))
}

//! Connection-related data models.
//!
//! This module defines the immutable [`ConnectionSpec`] resolved from the
//! process environment, and the acknowledgement returned by a successful
//! connect. The password is redacted from every Debug/Display rendering and
//! never appears in tool responses.

use crate::error::{Db2Error, Db2Result};
use serde::Serialize;

/// Environment variables the credential resolver reads.
pub const ENV_DATABASE: &str = "DB2_DATABASE";
pub const ENV_HOSTNAME: &str = "DB2_HOSTNAME";
pub const ENV_PORT: &str = "DB2_PORT";
pub const ENV_USERNAME: &str = "DB2_USERNAME";
pub const ENV_PASSWORD: &str = "DB2_PASSWORD";

/// Immutable bundle of credentials and network location for one DB2 database.
///
/// Constructed once per `connect_db` call, then passed by reference into the
/// session manager. Intentionally not `Serialize`: credentials must never be
/// echoed back over the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSpec {
    pub host: String,
    pub port: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl ConnectionSpec {
    /// Create a spec from explicit values.
    pub fn new(
        host: impl Into<String>,
        port: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            database: database.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Resolve connection details from the `DB2_*` environment variables.
    ///
    /// Unset variables resolve to empty strings so that [`validate`] can
    /// report every missing field at once.
    ///
    /// [`validate`]: ConnectionSpec::validate
    pub fn from_env() -> Self {
        let get = |key: &str| std::env::var(key).unwrap_or_default();
        Self {
            host: get(ENV_HOSTNAME),
            port: get(ENV_PORT),
            database: get(ENV_DATABASE),
            username: get(ENV_USERNAME),
            password: get(ENV_PASSWORD),
        }
    }

    /// Validate that all five fields are present and non-empty.
    pub fn validate(&self) -> Db2Result<()> {
        let mut missing = Vec::new();
        if self.database.trim().is_empty() {
            missing.push(ENV_DATABASE);
        }
        if self.host.trim().is_empty() {
            missing.push(ENV_HOSTNAME);
        }
        if self.port.trim().is_empty() {
            missing.push(ENV_PORT);
        }
        if self.username.trim().is_empty() {
            missing.push(ENV_USERNAME);
        }
        if self.password.is_empty() {
            missing.push(ENV_PASSWORD);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Db2Error::config(format!(
                "Missing connection parameters: {}",
                missing.join(", ")
            )))
        }
    }

    /// Render the DB2 CLI keyword connection string.
    ///
    /// Contains the password - never log the returned value.
    pub fn connection_string(&self) -> String {
        format!(
            "DATABASE={};HOSTNAME={};PORT={};PROTOCOL=TCPIP;UID={};PWD={};",
            self.database, self.host, self.port, self.username, self.password
        )
    }

    /// Display-safe location string (no credentials).
    pub fn location(&self) -> String {
        format!("{} on {}:{}", self.database, self.host, self.port)
    }
}

impl std::fmt::Debug for ConnectionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSpec")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// Acknowledgement returned by a successful connect.
#[derive(Debug, Clone, Serialize, schemars::JsonSchema)]
pub struct ConnectAck {
    /// Target database name.
    pub database: String,
    /// Target host.
    pub host: String,
    /// Target port.
    pub port: String,
    /// Human-readable status line.
    pub message: String,
}

impl ConnectAck {
    /// Build the acknowledgement for a spec that just connected.
    pub fn for_spec(spec: &ConnectionSpec) -> Self {
        Self {
            database: spec.database.clone(),
            host: spec.host.clone(),
            port: spec.port.clone(),
            message: format!("Successfully connected to DB2 database {}", spec.location()),
        }
    }
}

//! Query-related data models.
//!
//! This module defines the transport-safe scalar value and the tabular
//! [`QueryResult`] produced by `run_sql` and by stored procedure result sets.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How many prefix bytes of a binary value survive into the placeholder.
const BINARY_PREVIEW_BYTES: usize = 32;

/// A transport-safe scalar value.
///
/// Driver values are mapped into this closed set before they cross the MCP
/// boundary: numbers stay numbers, NULL stays null, date/time values travel
/// as text. Binary/LOB values never travel raw - see
/// [`Scalar::binary_placeholder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Scalar {
    /// SQL NULL
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Character data, including date/time values rendered as text
    Text(String),
}

impl Scalar {
    /// Check if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }

    /// Bounded placeholder for a binary/LOB value.
    ///
    /// Keeps protocol responses small: length plus a base64 prefix of at most
    /// [`BINARY_PREVIEW_BYTES`] bytes instead of the raw payload.
    pub fn binary_placeholder(bytes: &[u8]) -> Self {
        use base64::{Engine as _, engine::general_purpose::STANDARD};

        let preview_len = bytes.len().min(BINARY_PREVIEW_BYTES);
        let preview = STANDARD.encode(&bytes[..preview_len]);
        let suffix = if bytes.len() > preview_len { "..." } else { "" };
        Self::Text(format!(
            "<binary {} bytes, base64:{}{}>",
            bytes.len(),
            preview,
            suffix
        ))
    }
}

/// Tabular output of a query or a stored procedure result set.
///
/// Rows are positional: `rows[r][c]` belongs to `columns[c]`. Row order is
/// the driver's natural fetch order; no sorting is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QueryResult {
    /// Column names in driver-reported order.
    pub columns: Vec<String>,
    /// Rows in fetch order, each cell aligned with `columns`.
    pub rows: Vec<Vec<Scalar>>,
    /// Number of rows returned.
    pub row_count: usize,
    /// Statement execution plus fetch time in milliseconds.
    pub execution_time_ms: u64,
}

impl QueryResult {
    /// Create a result from fetched columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Scalar>>, execution_time_ms: u64) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            row_count,
            execution_time_ms,
        }
    }

    /// Check whether the result carries any rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

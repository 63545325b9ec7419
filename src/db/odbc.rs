//! ODBC backend over the DB2 CLI driver.
//!
//! Compiled behind the `odbc` feature so that the rest of the crate (and
//! its tests, which use the mock driver) builds without unixODBC and the
//! IBM CLI driver installed.
//!
//! All values cross the ODBC boundary as text. The CLI driver converts
//! bound text to the target SQL types on input, and fetched cells are
//! converted to [`Scalar`] using the reported column type. Binary columns
//! are never returned raw; they become the bounded placeholder from the
//! scalar model.

use crate::db::driver::{
    Db2Connection, Db2Driver, DriverError, RawCallOutcome, RawResultSet,
};
use crate::models::{ConnectionSpec, ParamType, ResolvedParam, Scalar};
use odbc_api::parameter::{InOut, VarCharArray};
use odbc_api::{Connection, ConnectionOptions, Cursor, CursorRow, Environment, ResultSetMetadata};
use std::sync::OnceLock;
use tracing::debug;

/// Widest ODBC text buffer bound per procedure parameter.
const PARAM_BUFFER_LEN: usize = 4000;

/// Maximum procedure parameters the backend can bind.
///
/// Parameters are bound as a fixed-arity tuple, one arm per arity.
pub const MAX_PROCEDURE_PARAMS: usize = 8;

/// ODBC needs one environment per process; handles borrow from it.
fn environment() -> Result<&'static Environment, DriverError> {
    static ENV: OnceLock<Environment> = OnceLock::new();
    if let Some(env) = ENV.get() {
        return Ok(env);
    }
    let env = Environment::new().map_err(from_odbc)?;
    Ok(ENV.get_or_init(|| env))
}

/// Driver backend over the IBM DB2 CLI ODBC driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct OdbcDriver;

impl OdbcDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Db2Driver for OdbcDriver {
    fn connect(&self, spec: &ConnectionSpec) -> Result<Box<dyn Db2Connection>, DriverError> {
        let env = environment()?;
        let connection = env
            .connect_with_connection_string(&spec.connection_string(), ConnectionOptions::default())
            .map_err(from_odbc)?;
        debug!("ODBC connection established");
        Ok(Box::new(OdbcConnection { connection }))
    }
}

struct OdbcConnection {
    connection: Connection<'static>,
}

impl Db2Connection for OdbcConnection {
    fn execute_query(&mut self, sql: &str) -> Result<RawResultSet, DriverError> {
        match self.connection.execute(sql, (), None).map_err(from_odbc)? {
            Some(mut cursor) => fetch_result_set(&mut cursor),
            None => Ok(RawResultSet::default()),
        }
    }

    fn call_procedure(
        &mut self,
        name: &str,
        params: &[ResolvedParam],
    ) -> Result<RawCallOutcome, DriverError> {
        if params.len() > MAX_PROCEDURE_PARAMS {
            return Err(DriverError::new(
                format!(
                    "procedures with more than {} parameters are not supported",
                    MAX_PROCEDURE_PARAMS
                ),
                None,
            ));
        }

        let placeholders = vec!["?"; params.len()].join(", ");
        let sql = if params.is_empty() {
            format!("CALL {}()", name)
        } else {
            format!("CALL {}({})", name, placeholders)
        };

        let mut buffers: Vec<VarCharArray<PARAM_BUFFER_LEN>> = params
            .iter()
            .map(|p| match &p.value {
                Scalar::Null => VarCharArray::NULL,
                value => VarCharArray::new(render_input(value).as_bytes()),
            })
            .collect();

        // Result sets must be drained before output buffers are valid.
        let result_sets = execute_call(&mut self.connection, &sql, &mut buffers)?;

        let output_values = params
            .iter()
            .zip(&buffers)
            .filter(|(p, _)| p.direction.produces_output())
            .map(|(p, buffer)| read_output(buffer, p.ty))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RawCallOutcome {
            result_sets,
            output_values,
        })
    }

    fn close(&mut self) {
        // The handle disconnects on drop; nothing further to release.
    }
}

/// Execute CALL with every parameter bound in/out as text.
fn execute_call(
    connection: &mut Connection<'static>,
    sql: &str,
    buffers: &mut [VarCharArray<PARAM_BUFFER_LEN>],
) -> Result<Vec<RawResultSet>, DriverError> {
    macro_rules! call {
        ($($b:ident),*) => {{
            let [$($b),*] = buffers else { unreachable!() };
            connection
                .execute(sql, ($(InOut($b),)*), None)
                .map_err(from_odbc)?
        }};
    }

    let cursor = match buffers.len() {
        0 => connection.execute(sql, (), None).map_err(from_odbc)?,
        1 => call!(a),
        2 => call!(a, b),
        3 => call!(a, b, c),
        4 => call!(a, b, c, d),
        5 => call!(a, b, c, d, e),
        6 => call!(a, b, c, d, e, f),
        7 => call!(a, b, c, d, e, f, g),
        8 => call!(a, b, c, d, e, f, g, h),
        n => {
            return Err(DriverError::new(
                format!("unsupported parameter count: {}", n),
                None,
            ));
        }
    };

    let mut result_sets = Vec::new();
    let mut current = cursor;
    while let Some(mut cursor) = current {
        result_sets.push(fetch_result_set(&mut cursor)?);
        current = cursor.more_results().map_err(from_odbc)?;
    }
    Ok(result_sets)
}

/// Column names plus every row, fetched eagerly.
fn fetch_result_set(cursor: &mut impl Cursor) -> Result<RawResultSet, DriverError> {
    let column_count = cursor.num_result_cols().map_err(from_odbc)? as u16;
    if column_count == 0 {
        return Ok(RawResultSet::default());
    }

    let mut columns = Vec::with_capacity(column_count as usize);
    let mut kinds = Vec::with_capacity(column_count as usize);
    for index in 1..=column_count {
        columns.push(cursor.col_name(index).map_err(from_odbc)?);
        kinds.push(column_kind(cursor, index)?);
    }

    let mut rows = Vec::new();
    while let Some(mut row) = cursor.next_row().map_err(from_odbc)? {
        let mut cells = Vec::with_capacity(column_count as usize);
        for (offset, kind) in kinds.iter().enumerate() {
            cells.push(fetch_cell(&mut row, offset as u16 + 1, *kind)?);
        }
        rows.push(cells);
    }

    Ok(RawResultSet { columns, rows })
}

/// Fetch-side classification of a result column.
#[derive(Debug, Clone, Copy)]
enum ColumnKind {
    Integer,
    Float,
    Binary,
    Text,
}

fn column_kind(cursor: &mut impl ResultSetMetadata, index: u16) -> Result<ColumnKind, DriverError> {
    use odbc_api::DataType;

    let kind = match cursor.col_data_type(index).map_err(from_odbc)? {
        DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt => {
            ColumnKind::Integer
        }
        DataType::Real { .. }
        | DataType::Float { .. }
        | DataType::Double { .. }
        | DataType::Decimal { .. }
        | DataType::Numeric { .. } => ColumnKind::Float,
        DataType::Binary { .. } | DataType::Varbinary { .. } | DataType::LongVarbinary { .. } => {
            ColumnKind::Binary
        }
        _ => ColumnKind::Text,
    };
    Ok(kind)
}

fn fetch_cell(row: &mut CursorRow<'_>, index: u16, kind: ColumnKind) -> Result<Scalar, DriverError> {
    match kind {
        ColumnKind::Integer => {
            let mut value = odbc_api::Nullable::<i64>::null();
            row.get_data(index, &mut value).map_err(from_odbc)?;
            Ok(value.into_opt().map_or(Scalar::Null, Scalar::Int))
        }
        ColumnKind::Float => {
            let mut value = odbc_api::Nullable::<f64>::null();
            row.get_data(index, &mut value).map_err(from_odbc)?;
            Ok(value.into_opt().map_or(Scalar::Null, Scalar::Float))
        }
        ColumnKind::Binary => {
            let mut buffer = Vec::new();
            let present = row.get_binary(index, &mut buffer).map_err(from_odbc)?;
            if present {
                Ok(Scalar::binary_placeholder(&buffer))
            } else {
                Ok(Scalar::Null)
            }
        }
        ColumnKind::Text => {
            let mut buffer = Vec::new();
            let present = row.get_text(index, &mut buffer).map_err(from_odbc)?;
            if present {
                Ok(Scalar::Text(String::from_utf8_lossy(&buffer).into_owned()))
            } else {
                Ok(Scalar::Null)
            }
        }
    }
}

/// Render an input value as the text the CLI driver will convert.
fn render_input(value: &Scalar) -> String {
    match value {
        Scalar::Null => String::new(),
        Scalar::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Text(s) => s.clone(),
    }
}

/// Convert an output buffer back per the declared parameter type.
fn read_output(
    buffer: &VarCharArray<PARAM_BUFFER_LEN>,
    ty: ParamType,
) -> Result<Scalar, DriverError> {
    // `as_bytes` is `None` for SQL NULL.
    let text = match buffer.as_bytes() {
        Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        None => return Ok(Scalar::Null),
    };

    let parse_error = |ty: ParamType| {
        DriverError::new(
            format!("output parameter value {:?} is not a valid {}", text, ty),
            None,
        )
    };

    match ty {
        ParamType::Integer => text
            .trim()
            .parse::<i64>()
            .map(Scalar::Int)
            .map_err(|_| parse_error(ty)),
        ParamType::Float => text
            .trim()
            .parse::<f64>()
            .map(Scalar::Float)
            .map_err(|_| parse_error(ty)),
        ParamType::Boolean => match text.trim() {
            "0" => Ok(Scalar::Bool(false)),
            "1" => Ok(Scalar::Bool(true)),
            _ => Err(parse_error(ty)),
        },
        ParamType::Text => Ok(Scalar::Text(text)),
        ParamType::Null => Ok(Scalar::Null),
    }
}

/// Map an odbc-api error onto the driver error, keeping the SQLSTATE.
fn from_odbc(error: odbc_api::Error) -> DriverError {
    match &error {
        odbc_api::Error::Diagnostics { record, .. } => {
            let state = String::from_utf8_lossy(&record.state.0).into_owned();
            let message = String::from_utf8_lossy(&record.message).into_owned();
            DriverError::new(message, Some(state))
        }
        // Anything other than a driver diagnostic means the handle state is
        // unknown; treat the connection as unusable.
        other => DriverError::new(other.to_string(), None).fatal(),
    }
}

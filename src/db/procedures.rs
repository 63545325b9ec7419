//! Stored procedure invocation.
//!
//! The invoker turns loosely typed JSON parameters into fully resolved
//! positional bindings, runs `CALL` through the session, and assembles the
//! procedure's result sets and output parameter values. Parameter problems
//! are caught before the driver is contacted.

use crate::db::session::SessionManager;
use crate::error::{Db2Error, Db2Result};
use crate::models::{
    ParamDirection, ParamType, ProcedureParamInput, ProcedureResult, ResolvedParam,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Invokes stored procedures on the shared session.
#[derive(Clone)]
pub struct ProcedureInvoker {
    session: Arc<SessionManager>,
}

impl ProcedureInvoker {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Call a stored procedure with positional parameters.
    ///
    /// The name may be schema-qualified (`SCHEMA.PROC`). A missing session
    /// surfaces as `NotConnected` before any argument is inspected.
    /// Parameter resolution failures surface as `ParameterBinding` without
    /// contacting the driver; database-side failures surface as `Procedure`
    /// with the driver's SQLSTATE.
    pub async fn call(
        &self,
        name: String,
        params: &[ProcedureParamInput],
    ) -> Db2Result<ProcedureResult> {
        if !self.session.is_connected() {
            return Err(Db2Error::NotConnected);
        }
        validate_procedure_name(&name)?;
        let resolved = resolve_params(params)?;

        debug!(procedure = %name, params = resolved.len(), "calling procedure");
        let started = Instant::now();

        let outcome = self
            .session
            .with_connection(move |conn| conn.call_procedure(&name, &resolved))
            .await?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(raw) => {
                let result = ProcedureResult {
                    output_values: raw.output_values,
                    result_sets: raw
                        .result_sets
                        .into_iter()
                        .map(|set| set.into_query_result(elapsed_ms))
                        .collect(),
                };
                debug!(
                    result_sets = result.result_sets.len(),
                    output_values = result.output_values.len(),
                    elapsed_ms,
                    "procedure completed"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "procedure call failed");
                Err(Db2Error::procedure(
                    e.message().to_string(),
                    e.sqlstate().map(String::from),
                ))
            }
        }
    }
}

/// Resolve caller-supplied parameters into driver bindings.
///
/// Bare scalars become `in` parameters with inferred types. Declared
/// parameters must be internally consistent: `in`/`inout` need a value,
/// `out` needs a type tag instead, and an explicit type tag must accept the
/// supplied value.
pub fn resolve_params(params: &[ProcedureParamInput]) -> Db2Result<Vec<ResolvedParam>> {
    params
        .iter()
        .enumerate()
        .map(|(index, param)| resolve_one(index + 1, param))
        .collect()
}

fn resolve_one(position: usize, param: &ProcedureParamInput) -> Db2Result<ResolvedParam> {
    match param {
        ProcedureParamInput::Value(value) => Ok(ResolvedParam::input(value.clone())),
        ProcedureParamInput::Declared {
            value,
            direction,
            type_hint,
        } => match direction {
            ParamDirection::Out => {
                if value.as_ref().is_some_and(|v| !v.is_null()) {
                    return Err(Db2Error::parameter_binding(format!(
                        "parameter {}: out parameters take no input value",
                        position
                    )));
                }
                let ty = type_hint.ok_or_else(|| {
                    Db2Error::parameter_binding(format!(
                        "parameter {}: out parameters require a type tag",
                        position
                    ))
                })?;
                Ok(ResolvedParam::output(ty))
            }
            ParamDirection::In | ParamDirection::InOut => {
                let value = value.clone().ok_or_else(|| {
                    Db2Error::parameter_binding(format!(
                        "parameter {}: {} parameters require a value",
                        position, direction
                    ))
                })?;
                let ty = match type_hint {
                    Some(ty) => {
                        if !ty.accepts(&value) {
                            return Err(Db2Error::parameter_binding(format!(
                                "parameter {}: value of type {} does not match declared type {}",
                                position,
                                value.type_name(),
                                ty
                            )));
                        }
                        *ty
                    }
                    None => ParamType::infer(&value),
                };
                Ok(ResolvedParam {
                    value,
                    direction: *direction,
                    ty,
                })
            }
        },
    }
}

/// Check that the name is a plain or schema-qualified SQL identifier.
///
/// Rejecting anything else here keeps caller input out of the generated
/// `CALL` statement text.
fn validate_procedure_name(name: &str) -> Db2Result<()> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.is_empty() || parts.len() > 2 {
        return Err(Db2Error::parameter_binding(format!(
            "invalid procedure name: {}",
            name
        )));
    }
    for part in parts {
        let mut chars = part.chars();
        let leading_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        // DB2 ordinary identifiers also allow @, #, and $.
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '@' | '#' | '$'));
        if !leading_ok || !rest_ok {
            return Err(Db2Error::parameter_binding(format!(
                "invalid procedure name: {}",
                name
            )));
        }
    }
    Ok(())
}

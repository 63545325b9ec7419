//! Stored procedure tool.
//!
//! Implements the `call_sp` MCP tool. Parameters are positional; a bare
//! JSON scalar is an `in` parameter, and an object form declares direction
//! and type for `out`/`inout` parameters.

use crate::db::{ProcedureInvoker, SessionManager};
use crate::error::{Db2Error, Db2Result};
use crate::models::{ProcedureParamInput, ProcedureResult, QueryResult, Scalar};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Input for the call_sp tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CallSpInput {
    /// Procedure name, optionally schema-qualified (e.g. "MYSCHEMA.MYPROC")
    pub sp_name: String,
    /// Positional parameters. A bare scalar is an `in` parameter; an object
    /// like {"value": null, "direction": "out", "type": "integer"} declares
    /// direction and type.
    #[serde(default)]
    pub parameters: Vec<ProcedureParamInput>,
}

/// Output from the call_sp tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CallSpOutput {
    /// Always "success"
    pub status: String,
    /// Human-readable confirmation
    pub message: String,
    /// Values of out/inout parameters, in declaration order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_values: Vec<Scalar>,
    /// Result sets produced by the procedure
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub result_sets: Vec<QueryResult>,
}

impl CallSpOutput {
    fn for_call(sp_name: &str, result: ProcedureResult) -> Self {
        Self {
            status: "success".to_string(),
            message: format!("Stored procedure {} executed successfully", sp_name),
            output_values: result.output_values,
            result_sets: result.result_sets,
        }
    }
}

/// Handler for the call_sp tool.
pub struct ProcedureToolHandler {
    invoker: ProcedureInvoker,
}

impl ProcedureToolHandler {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            invoker: ProcedureInvoker::new(session),
        }
    }

    /// Call a stored procedure and collect its outputs.
    pub async fn call(&self, input: CallSpInput) -> Db2Result<CallSpOutput> {
        let sp_name = input.sp_name.trim().to_string();
        if sp_name.is_empty() {
            return Err(Db2Error::parameter_binding("sp_name is required"));
        }

        let result = self.invoker.call(sp_name.clone(), &input.parameters).await?;
        info!(
            procedure = %sp_name,
            output_values = result.output_values.len(),
            result_sets = result.result_sets.len(),
            "call_sp succeeded"
        );
        Ok(CallSpOutput::for_call(&sp_name, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::driver::{RawCallOutcome, RawResultSet};
    use crate::db::MockDriver;
    use crate::models::ConnectionSpec;

    async fn handler_with(driver: MockDriver) -> ProcedureToolHandler {
        let session = Arc::new(SessionManager::new(Arc::new(driver)));
        session
            .connect(&ConnectionSpec::new("h", "50000", "SAMPLE", "u", "p"))
            .await
            .unwrap();
        ProcedureToolHandler::new(session)
    }

    #[tokio::test]
    async fn test_call_sp_success_shape() {
        let driver = MockDriver::new();
        driver.script_procedure(
            "MYSCHEMA.GET_COUNT",
            RawCallOutcome {
                result_sets: vec![],
                output_values: vec![Scalar::Int(42)],
            },
        );
        let handler = handler_with(driver).await;

        let input: CallSpInput = serde_json::from_value(serde_json::json!({
            "sp_name": "MYSCHEMA.GET_COUNT",
            "parameters": [{"direction": "out", "type": "integer"}]
        }))
        .unwrap();

        let output = handler.call(input).await.unwrap();
        assert_eq!(output.status, "success");
        assert!(output.message.contains("GET_COUNT"));
        assert_eq!(output.output_values, vec![Scalar::Int(42)]);
        assert!(output.result_sets.is_empty());
    }

    #[tokio::test]
    async fn test_call_sp_bare_scalars_are_inputs() {
        let driver = MockDriver::new();
        driver.script_procedure("ADD_STAFF", RawCallOutcome::default());
        let handler = handler_with(driver.clone()).await;

        let input: CallSpInput = serde_json::from_value(serde_json::json!({
            "sp_name": "ADD_STAFF",
            "parameters": [7, "Sanders", 18357.5, null]
        }))
        .unwrap();

        handler.call(input).await.unwrap();
        assert_eq!(
            driver.statements_executed(),
            vec!["CALL ADD_STAFF [4 params]".to_string()]
        );
    }

    #[tokio::test]
    async fn test_call_sp_with_result_sets() {
        let driver = MockDriver::new();
        driver.script_procedure(
            "LIST_STAFF",
            RawCallOutcome {
                result_sets: vec![RawResultSet {
                    columns: vec!["ID".to_string()],
                    rows: vec![vec![Scalar::Int(10)], vec![Scalar::Int(20)]],
                }],
                output_values: vec![],
            },
        );
        let handler = handler_with(driver).await;

        let output = handler
            .call(CallSpInput {
                sp_name: "LIST_STAFF".to_string(),
                parameters: vec![],
            })
            .await
            .unwrap();
        assert_eq!(output.result_sets.len(), 1);
        assert_eq!(output.result_sets[0].row_count, 2);
    }

    #[tokio::test]
    async fn test_call_sp_rejects_blank_name() {
        let handler = handler_with(MockDriver::new()).await;
        let err = handler
            .call(CallSpInput {
                sp_name: "  ".to_string(),
                parameters: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Db2Error::ParameterBinding { .. }));
    }
}

//! Stored procedure data models.
//!
//! Parameters carry an explicit direction and a tagged scalar type resolved
//! before binding; the driver boundary never sees an untyped value.

use crate::models::query::{QueryResult, Scalar};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Direction of a stored procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParamDirection {
    /// Input parameter (default when the caller passes a bare value).
    #[default]
    In,
    /// Output parameter; value read back after execution.
    Out,
    /// Input/output parameter.
    InOut,
}

impl ParamDirection {
    /// Whether a value is read back for this direction after execution.
    pub fn produces_output(self) -> bool {
        matches!(self, Self::Out | Self::InOut)
    }
}

impl std::fmt::Display for ParamDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
            Self::InOut => write!(f, "inout"),
        }
    }
}

/// Tagged scalar type of a stored procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Integer,
    Float,
    Text,
    Boolean,
    Null,
}

impl ParamType {
    /// Infer the type tag from a scalar value.
    pub fn infer(value: &Scalar) -> Self {
        match value {
            Scalar::Null => Self::Null,
            Scalar::Bool(_) => Self::Boolean,
            Scalar::Int(_) => Self::Integer,
            Scalar::Float(_) => Self::Float,
            Scalar::Text(_) => Self::Text,
        }
    }

    /// Whether a scalar value is compatible with this type tag.
    pub fn accepts(self, value: &Scalar) -> bool {
        match (self, value) {
            // NULL is a member of every SQL type.
            (_, Scalar::Null) => true,
            (Self::Integer, Scalar::Int(_)) => true,
            // Integers widen into float parameters.
            (Self::Float, Scalar::Float(_) | Scalar::Int(_)) => true,
            (Self::Text, Scalar::Text(_)) => true,
            (Self::Boolean, Scalar::Bool(_)) => true,
            (Self::Null, _) => false,
            _ => false,
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Null => "null",
        };
        f.write_str(name)
    }
}

/// One `call_sp` parameter as supplied by the caller.
///
/// Either a bare JSON scalar (an `in` parameter with inferred type) or an
/// object declaring value, direction, and an optional type hint:
///
/// ```json
/// [42, {"value": null, "direction": "out", "type": "integer"}]
/// ```
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ProcedureParamInput {
    /// Bare scalar value; direction `in`, type inferred.
    Value(Scalar),
    /// Explicit parameter declaration.
    Declared {
        /// Parameter value. Optional for `out` parameters.
        #[serde(default)]
        value: Option<Scalar>,
        /// Binding direction. Default: `in`.
        #[serde(default)]
        direction: ParamDirection,
        /// Explicit type tag; inferred from the value when omitted.
        #[serde(rename = "type", default)]
        type_hint: Option<ParamType>,
    },
}

/// A parameter with value, direction, and type fully resolved.
///
/// This is the only parameter shape the driver boundary accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParam {
    pub value: Scalar,
    pub direction: ParamDirection,
    pub ty: ParamType,
}

impl ResolvedParam {
    /// Convenience constructor for an `in` parameter.
    pub fn input(value: Scalar) -> Self {
        let ty = ParamType::infer(&value);
        Self {
            value,
            direction: ParamDirection::In,
            ty,
        }
    }

    /// Convenience constructor for an `out` parameter of the given type.
    pub fn output(ty: ParamType) -> Self {
        Self {
            value: Scalar::Null,
            direction: ParamDirection::Out,
            ty,
        }
    }
}

/// Output of a stored procedure invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProcedureResult {
    /// Values of `out`/`inout` parameters, in declaration order.
    pub output_values: Vec<Scalar>,
    /// Result sets produced by the procedure, in driver order.
    pub result_sets: Vec<QueryResult>,
}

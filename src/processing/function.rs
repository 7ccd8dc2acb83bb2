//! Unary functions.

use serde::{Deserialize, Serialize};

use crate::error::{OperatorError, OperatorResult};
use crate::types::{Number, NumericKind, Value};

use super::adapter::AdaptedFunction;
use super::aggregation::NumericTypeLock;
use super::composite::FunctionComposite;

/// Closed set of configurable functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum Function {
    /// Returns its input.
    #[serde(rename = "function.Identity")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.function.Identity")]
    Identity,
    #[serde(rename = "function.Length")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.function.Length")]
    Length(Length),
    #[serde(rename = "function.DefaultIfEmpty")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.function.DefaultIfEmpty")]
    DefaultIfEmpty(DefaultIfEmpty),
    #[serde(rename = "function.MultiplyBy")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.function.MultiplyBy")]
    MultiplyBy(MultiplyBy),
    #[serde(rename = "function.MultiplyLongBy")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.function.MultiplyLongBy")]
    MultiplyLongBy(MultiplyLongBy),
    #[serde(rename = "tuple.AdaptedFunction")]
    #[serde(alias = "uk.gov.gchq.koryphe.tuple.function.TupleAdaptedFunction")]
    Adapted(Box<AdaptedFunction>),
    #[serde(rename = "function.Composite")]
    #[serde(alias = "uk.gov.gchq.koryphe.function.FunctionComposite")]
    #[serde(alias = "uk.gov.gchq.koryphe.tuple.function.TupleAdaptedFunctionComposite")]
    Composite(FunctionComposite),
}

impl Function {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::Length(_) => "Length",
            Self::DefaultIfEmpty(_) => "DefaultIfEmpty",
            Self::MultiplyBy(_) => "MultiplyBy",
            Self::MultiplyLongBy(_) => "MultiplyLongBy",
            Self::Adapted(_) => "AdaptedFunction",
            Self::Composite(_) => "FunctionComposite",
        }
    }

    /// Number of projected fields this function takes, if fixed.
    pub fn input_arity(&self) -> Option<usize> {
        match self {
            Self::Identity | Self::Adapted(_) => None,
            Self::Composite(c) => c.functions().first().and_then(Self::input_arity),
            _ => Some(1),
        }
    }

    /// Number of fields this function produces, if fixed.
    pub fn output_arity(&self) -> Option<usize> {
        match self {
            Self::Identity | Self::Adapted(_) => None,
            Self::Composite(c) => c.functions().last().and_then(Self::output_arity),
            _ => Some(1),
        }
    }

    pub fn apply(&self, input: Value) -> OperatorResult<Value> {
        match self {
            Self::Identity => Ok(input),
            Self::Length(f) => f.apply(&input),
            Self::DefaultIfEmpty(f) => f.apply(input),
            Self::MultiplyBy(f) => f.apply(input),
            Self::MultiplyLongBy(f) => f.apply(input),
            Self::Adapted(f) => f.apply(input),
            Self::Composite(f) => f.apply(input),
        }
    }
}

/// Length of a string, list or tuple.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Length {
    /// Inputs longer than this are rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl Length {
    fn apply(&self, input: &Value) -> OperatorResult<Value> {
        let len = match input {
            Value::Null => 0,
            other => measure(other).ok_or(OperatorError::UnsupportedValue {
                unit: "Length",
                found: other.type_name(),
            })?,
        };
        if let Some(max) = self.max_length {
            if len > max {
                return Err(OperatorError::UnsupportedValue {
                    unit: "Length",
                    found: "over-length",
                });
            }
        }
        let len = i32::try_from(len).unwrap_or(i32::MAX);
        Ok(Value::from(len))
    }
}

fn measure(value: &Value) -> Option<usize> {
    match value {
        Value::Utf8(s) => Some(s.chars().count()),
        Value::List(items) => Some(items.len()),
        Value::Tuple(t) => Some(t.len()),
        _ => None,
    }
}

/// Replaces an empty string, list or tuple with a configured default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultIfEmpty {
    #[serde(default)]
    pub default_value: Value,
}

impl DefaultIfEmpty {
    pub fn new(default_value: impl Into<Value>) -> Self {
        Self {
            default_value: default_value.into(),
        }
    }

    fn apply(&self, input: Value) -> OperatorResult<Value> {
        if input.is_null() {
            return Ok(Value::Null);
        }
        match measure(&input) {
            Some(0) => Ok(self.default_value.clone()),
            Some(_) => Ok(input),
            None => Err(OperatorError::UnsupportedValue {
                unit: "DefaultIfEmpty",
                found: input.type_name(),
            }),
        }
    }
}

/// Multiplies an `Int32` by a configured factor, saturating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplyBy {
    #[serde(default = "identity_factor")]
    pub by: i32,
}

fn identity_factor() -> i32 {
    1
}

impl Default for MultiplyBy {
    fn default() -> Self {
        Self { by: 1 }
    }
}

impl MultiplyBy {
    pub fn new(by: i32) -> Self {
        Self { by }
    }

    fn apply(&self, input: Value) -> OperatorResult<Value> {
        match input {
            Value::Null => Ok(Value::Null),
            Value::Number(Number::Int32(v)) => Ok(Value::from(v.saturating_mul(self.by))),
            other => Err(multiply_mismatch("MultiplyBy", NumericKind::Int32, &other)),
        }
    }
}

/// Multiplies an `Int64` by a configured factor, saturating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplyLongBy {
    #[serde(default = "identity_long_factor")]
    pub by: i64,
}

fn identity_long_factor() -> i64 {
    1
}

impl Default for MultiplyLongBy {
    fn default() -> Self {
        Self { by: 1 }
    }
}

impl MultiplyLongBy {
    pub fn new(by: i64) -> Self {
        Self { by }
    }

    fn apply(&self, input: Value) -> OperatorResult<Value> {
        match input {
            Value::Null => Ok(Value::Null),
            Value::Number(Number::Int64(v)) => Ok(Value::from(v.saturating_mul(self.by))),
            other => Err(multiply_mismatch("MultiplyLongBy", NumericKind::Int64, &other)),
        }
    }
}

fn multiply_mismatch(unit: &'static str, expected: NumericKind, input: &Value) -> OperatorError {
    match input.as_number() {
        Some(n) => match NumericTypeLock::check(expected, n.kind()) {
            Err(e) => e,
            Ok(()) => OperatorError::UnsupportedValue {
                unit,
                found: input.type_name(),
            },
        },
        None => OperatorError::UnsupportedValue {
            unit,
            found: input.type_name(),
        },
    }
}

//! Reducing (binary) operators.
//!
//! A [`BinaryOperator`] folds an input value into a state value: `apply(state, input)`.
//! Operators hold configuration only; the accumulated state is always passed in and
//! returned by the caller, so one configured operator can drive any number of independent
//! fold chains, including concurrently.

use serde::{Deserialize, Serialize};

use crate::error::{OperatorError, OperatorResult};
use crate::tuple::Key;
use crate::types::Value;

use super::adapter::AdaptedBinaryOperator;
use super::aggregation::{AggregationState, NumericReducer};
use super::composite::BinaryOperatorComposite;

/// Closed set of configurable binary operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum BinaryOperator {
    /// Numeric sum, kind-locked and saturating.
    #[serde(rename = "binaryoperator.Sum")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.binaryoperator.Sum")]
    Sum,
    /// Numeric product, kind-locked and saturating.
    #[serde(rename = "binaryoperator.Product")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.binaryoperator.Product")]
    Product,
    /// Numeric minimum, kind-locked.
    #[serde(rename = "binaryoperator.Min")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.binaryoperator.Min")]
    Min,
    /// Numeric maximum, kind-locked.
    #[serde(rename = "binaryoperator.Max")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.binaryoperator.Max")]
    Max,
    /// Keeps the first non-null value.
    #[serde(rename = "binaryoperator.First")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.binaryoperator.First")]
    First,
    /// Keeps the most recent non-null value.
    #[serde(rename = "binaryoperator.Last")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.binaryoperator.Last")]
    Last,
    /// Logical conjunction of booleans.
    #[serde(rename = "binaryoperator.And")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.binaryoperator.And")]
    And,
    /// Logical disjunction of booleans.
    #[serde(rename = "binaryoperator.Or")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.binaryoperator.Or")]
    Or,
    #[serde(rename = "binaryoperator.StringConcat")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.binaryoperator.StringConcat")]
    StringConcat(StringConcat),
    #[serde(rename = "tuple.AdaptedBinaryOperator")]
    #[serde(alias = "uk.gov.gchq.koryphe.tuple.binaryoperator.TupleAdaptedBinaryOperator")]
    Adapted(Box<AdaptedBinaryOperator>),
    #[serde(rename = "binaryoperator.Composite")]
    #[serde(alias = "uk.gov.gchq.koryphe.binaryoperator.BinaryOperatorComposite")]
    #[serde(alias = "uk.gov.gchq.koryphe.tuple.binaryoperator.TupleAdaptedBinaryOperatorComposite")]
    Composite(BinaryOperatorComposite),
}

impl BinaryOperator {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sum => "Sum",
            Self::Product => "Product",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::First => "First",
            Self::Last => "Last",
            Self::And => "And",
            Self::Or => "Or",
            Self::StringConcat(_) => "StringConcat",
            Self::Adapted(_) => "AdaptedBinaryOperator",
            Self::Composite(_) => "BinaryOperatorComposite",
        }
    }

    /// Number of projected fields this operator folds, if fixed.
    ///
    /// Adapted and composite operators consume whole tuples and report `None`.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::Adapted(_) | Self::Composite(_) => None,
            _ => Some(1),
        }
    }

    /// The strict-kind reducer behind a numeric operator.
    pub fn numeric_reducer(&self) -> Option<NumericReducer> {
        match self {
            Self::Sum => Some(NumericReducer::Sum),
            Self::Product => Some(NumericReducer::Product),
            Self::Min => Some(NumericReducer::Min),
            Self::Max => Some(NumericReducer::Max),
            _ => None,
        }
    }

    /// Fold `input` into `state`.
    ///
    /// A `Null` input leaves the state unchanged. A `Null` state is replaced by the input,
    /// subject to the operator's type checks.
    pub fn apply(&self, state: Value, input: Value) -> OperatorResult<Value> {
        match self {
            Self::Sum => fold_numeric(NumericReducer::Sum, state, input),
            Self::Product => fold_numeric(NumericReducer::Product, state, input),
            Self::Min => fold_numeric(NumericReducer::Min, state, input),
            Self::Max => fold_numeric(NumericReducer::Max, state, input),
            Self::First => Ok(if state.is_null() { input } else { state }),
            Self::Last => Ok(if input.is_null() { state } else { input }),
            Self::And => fold_bool(self.name(), state, input, |a, b| a && b),
            Self::Or => fold_bool(self.name(), state, input, |a, b| a || b),
            Self::StringConcat(concat) => concat.apply(state, input),
            Self::Adapted(adapted) => adapted.apply(state, input),
            Self::Composite(composite) => composite.apply(state, input),
        }
    }

    /// Keys of the state record this operator folds into.
    ///
    /// Empty for scalar operators, which own the whole state value.
    pub fn state_keys(&self) -> Vec<&Key> {
        match self {
            Self::Adapted(adapted) => adapted.state_keys(),
            Self::Composite(composite) => composite.state_keys(),
            _ => Vec::new(),
        }
    }

    /// Combine two partial states folded over consecutive runs of inputs.
    ///
    /// Scalar operators merge by folding `right` into `left`; adapted and composite
    /// operators merge slot by slot.
    pub fn merge(&self, left: Value, right: Value) -> OperatorResult<Value> {
        match self {
            Self::Adapted(adapted) => adapted.merge(left, right),
            Self::Composite(composite) => composite.merge(left, right),
            _ => self.apply(left, right),
        }
    }

    /// Fold a sequence of inputs from a `Null` state.
    pub fn fold<I>(&self, inputs: I) -> OperatorResult<Value>
    where
        I: IntoIterator<Item = Value>,
    {
        inputs
            .into_iter()
            .try_fold(Value::Null, |state, input| self.apply(state, input))
    }
}

fn fold_numeric(reducer: NumericReducer, state: Value, input: Value) -> OperatorResult<Value> {
    let current = AggregationState::from_value(&state, reducer.name())?;
    let number = match &input {
        Value::Null => None,
        Value::Number(n) => Some(n),
        other => {
            return Err(OperatorError::UnsupportedValue {
                unit: reducer.name(),
                found: other.type_name(),
            });
        }
    };
    Ok(reducer.combine(&current, number)?.into_field())
}

fn fold_bool(
    unit: &'static str,
    state: Value,
    input: Value,
    op: impl Fn(bool, bool) -> bool,
) -> OperatorResult<Value> {
    match (state, input) {
        (state, Value::Null) => Ok(state),
        (Value::Null, Value::Bool(b)) => Ok(Value::Bool(b)),
        (_, input @ (Value::Number(_) | Value::Utf8(_) | Value::List(_) | Value::Tuple(_))) => {
            Err(OperatorError::UnsupportedValue {
                unit,
                found: input.type_name(),
            })
        }
        (state, _) => Err(OperatorError::UnsupportedValue {
            unit,
            found: state.type_name(),
        }),
    }
}

/// Joins strings with a separator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringConcat {
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    ",".to_string()
}

impl Default for StringConcat {
    fn default() -> Self {
        Self {
            separator: default_separator(),
        }
    }
}

impl StringConcat {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    fn apply(&self, state: Value, input: Value) -> OperatorResult<Value> {
        match (state, input) {
            (state, Value::Null) => Ok(state),
            (Value::Null, Value::Utf8(s)) => Ok(Value::Utf8(s)),
            (Value::Utf8(mut acc), Value::Utf8(s)) => {
                acc.push_str(&self.separator);
                acc.push_str(&s);
                Ok(Value::Utf8(acc))
            }
            (_, input @ (Value::Bool(_) | Value::Number(_) | Value::List(_) | Value::Tuple(_))) => {
                Err(OperatorError::UnsupportedValue {
                    unit: "StringConcat",
                    found: input.type_name(),
                })
            }
            (state, _) => Err(OperatorError::UnsupportedValue {
                unit: "StringConcat",
                found: state.type_name(),
            }),
        }
    }
}

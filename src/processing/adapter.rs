//! Tuple selection adapters.
//!
//! An adapter binds a unit to tuple keys: it projects the selected fields out of a record,
//! runs the unit on them, and (optionally) writes the result back into the record.
//!
//! - A single-key selection projects the bare field value.
//! - A multi-key selection projects a positional [`Tuple`], in selection order.
//! - Missing fields project as `Null`.
//!
//! Arity is checked when an adapter is built or deserialised, not when it runs.

use serde::{Deserialize, Serialize};

use crate::error::{OperatorError, OperatorResult};
use crate::tuple::{Key, Selection, Tuple};
use crate::types::Value;

use super::binary_operator::BinaryOperator;
use super::function::Function;
use super::predicate::Predicate;

/// Project `selection` out of `tuple`.
pub fn project(tuple: &Tuple, selection: &Selection) -> Value {
    let field = |key: &Key| tuple.get(key).cloned().unwrap_or_default();
    match selection.keys() {
        [key] => field(key),
        keys => Value::Tuple(Tuple::new(keys.iter().map(field).collect())),
    }
}

/// Write `result` into `tuple` at `projection`.
///
/// A multi-key projection takes the fields of a tuple or list result in order.
pub fn write_back(tuple: &mut Tuple, projection: &Selection, result: Value) -> OperatorResult<()> {
    if let [key] = projection.keys() {
        return tuple.put(key, result);
    }
    let values = match result {
        Value::Tuple(t) => t.into_values(),
        Value::List(items) => items,
        other => {
            return Err(OperatorError::configuration(format!(
                "projection {projection} needs {} fields but the result is a single {} value",
                projection.len(),
                other.type_name()
            )));
        }
    };
    if values.len() != projection.len() {
        return Err(OperatorError::configuration(format!(
            "projection {projection} needs {} fields but the result has {}",
            projection.len(),
            values.len()
        )));
    }
    for (key, value) in projection.keys().iter().zip(values) {
        tuple.put(key, value)?;
    }
    Ok(())
}

fn check_arity(
    unit: &str,
    expected: Option<usize>,
    role: &str,
    selection: &Selection,
) -> OperatorResult<()> {
    match expected {
        Some(n) if n != selection.len() => Err(OperatorError::configuration(format!(
            "{unit} takes {n} field(s) but {role} {selection} has {}",
            selection.len()
        ))),
        _ => Ok(()),
    }
}

fn expect_tuple(unit: &'static str, value: Value) -> OperatorResult<Tuple> {
    match value {
        Value::Tuple(t) => Ok(t),
        other => Err(OperatorError::UnsupportedValue {
            unit,
            found: other.type_name(),
        }),
    }
}

/// A function bound to tuple keys.
///
/// Without a projection the function's result replaces the whole record; with one, the
/// result is written back and every other field is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AdaptedFunctionConfig")]
pub struct AdaptedFunction {
    selection: Selection,
    function: Function,
    #[serde(skip_serializing_if = "Option::is_none")]
    projection: Option<Selection>,
}

#[derive(Deserialize)]
struct AdaptedFunctionConfig {
    selection: Selection,
    function: Function,
    #[serde(default)]
    projection: Option<Selection>,
}

impl TryFrom<AdaptedFunctionConfig> for AdaptedFunction {
    type Error = OperatorError;

    fn try_from(c: AdaptedFunctionConfig) -> Result<Self, Self::Error> {
        Self::new(c.selection, c.function, c.projection)
    }
}

impl AdaptedFunction {
    pub fn new(
        selection: Selection,
        function: Function,
        projection: Option<Selection>,
    ) -> OperatorResult<Self> {
        check_arity(function.name(), function.input_arity(), "selection", &selection)?;
        if let Some(p) = &projection {
            check_arity(function.name(), function.output_arity(), "projection", p)?;
        }
        Ok(Self {
            selection,
            function,
            projection,
        })
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn function(&self) -> &Function {
        &self.function
    }

    pub fn projection(&self) -> Option<&Selection> {
        self.projection.as_ref()
    }

    /// Apply to a record. A `Null` record stays `Null`.
    pub fn apply(&self, input: Value) -> OperatorResult<Value> {
        if input.is_null() {
            return Ok(Value::Null);
        }
        let mut tuple = expect_tuple("AdaptedFunction", input)?;
        let result = self.function.apply(project(&tuple, &self.selection))?;
        match &self.projection {
            None => Ok(result),
            Some(projection) => {
                write_back(&mut tuple, projection, result)?;
                Ok(Value::Tuple(tuple))
            }
        }
    }
}

/// A predicate bound to tuple keys. Non-tuple inputs are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AdaptedPredicateConfig")]
pub struct AdaptedPredicate {
    selection: Selection,
    predicate: Predicate,
}

#[derive(Deserialize)]
struct AdaptedPredicateConfig {
    selection: Selection,
    predicate: Predicate,
}

impl TryFrom<AdaptedPredicateConfig> for AdaptedPredicate {
    type Error = OperatorError;

    fn try_from(c: AdaptedPredicateConfig) -> Result<Self, Self::Error> {
        Self::new(c.selection, c.predicate)
    }
}

impl AdaptedPredicate {
    pub fn new(selection: Selection, predicate: Predicate) -> OperatorResult<Self> {
        check_arity(predicate.name(), predicate.arity(), "selection", &selection)?;
        Ok(Self {
            selection,
            predicate,
        })
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn test(&self, input: &Value) -> bool {
        match input {
            Value::Tuple(t) => self.predicate.test(&project(t, &self.selection)),
            _ => false,
        }
    }
}

/// A binary operator bound to tuple keys.
///
/// Incoming values are read at `selection` of the input record. The running state lives in
/// the state record at the output keys (`projection`, defaulting to `selection`), and the
/// folded result is written back there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AdaptedBinaryOperatorConfig")]
pub struct AdaptedBinaryOperator {
    selection: Selection,
    operator: BinaryOperator,
    #[serde(skip_serializing_if = "Option::is_none")]
    projection: Option<Selection>,
}

#[derive(Deserialize)]
struct AdaptedBinaryOperatorConfig {
    selection: Selection,
    #[serde(alias = "binaryOperator")]
    operator: BinaryOperator,
    #[serde(default)]
    projection: Option<Selection>,
}

impl TryFrom<AdaptedBinaryOperatorConfig> for AdaptedBinaryOperator {
    type Error = OperatorError;

    fn try_from(c: AdaptedBinaryOperatorConfig) -> Result<Self, Self::Error> {
        Self::new(c.selection, c.operator, c.projection)
    }
}

impl AdaptedBinaryOperator {
    pub fn new(
        selection: Selection,
        operator: BinaryOperator,
        projection: Option<Selection>,
    ) -> OperatorResult<Self> {
        check_arity(operator.name(), operator.arity(), "selection", &selection)?;
        if let Some(p) = &projection {
            check_arity(operator.name(), Some(selection.len()), "projection", p)?;
        }
        Ok(Self {
            selection,
            operator,
            projection,
        })
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn operator(&self) -> &BinaryOperator {
        &self.operator
    }

    pub fn projection(&self) -> Option<&Selection> {
        self.projection.as_ref()
    }

    /// Keys holding this binding's running state.
    pub fn output_selection(&self) -> &Selection {
        self.projection.as_ref().unwrap_or(&self.selection)
    }

    /// State slots of this binding. The wrapped operator's own slots live inside these.
    pub fn state_keys(&self) -> Vec<&Key> {
        self.output_selection().keys().iter().collect()
    }

    /// Fold the `input` record into the `state` record.
    ///
    /// A `Null` input leaves the state unchanged; a `Null` state starts from a copy of the
    /// input record whose state slot is folded from empty.
    pub fn apply(&self, state: Value, input: Value) -> OperatorResult<Value> {
        if input.is_null() {
            return Ok(state);
        }
        let input = expect_tuple("AdaptedBinaryOperator", input)?;
        let output = self.output_selection();
        let (mut state, current) = match state {
            Value::Null => (input.clone(), Value::Null),
            other => {
                let t = expect_tuple("AdaptedBinaryOperator", other)?;
                let current = project(&t, output);
                (t, current)
            }
        };
        let result = self
            .operator
            .apply(current, project(&input, &self.selection))?;
        write_back(&mut state, output, result)?;
        Ok(Value::Tuple(state))
    }

    /// Combine two partial state records, `right` having been folded after `left`.
    pub fn merge(&self, left: Value, right: Value) -> OperatorResult<Value> {
        let (mut left, right) = match (left, right) {
            (Value::Null, right) => return Ok(right),
            (left, Value::Null) => return Ok(left),
            (left, right) => (
                expect_tuple("AdaptedBinaryOperator", left)?,
                expect_tuple("AdaptedBinaryOperator", right)?,
            ),
        };
        let output = self.output_selection();
        let merged = self
            .operator
            .merge(project(&left, output), project(&right, output))?;
        write_back(&mut left, output, merged)?;
        Ok(Value::Tuple(left))
    }
}

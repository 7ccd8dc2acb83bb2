//! Ordered compositions of units.
//!
//! Members run strictly in order over the same record, so a later member observes what an
//! earlier one wrote. Composites of adapted members are how several independent transforms
//! or reductions are applied to one wide record.

use serde::{Deserialize, Serialize};

use crate::error::{OperatorError, OperatorResult};
use crate::tuple::{Key, Selection};
use crate::types::Value;

use super::adapter::{AdaptedBinaryOperator, AdaptedFunction};
use super::binary_operator::BinaryOperator;
use super::function::Function;

/// Functions applied in sequence, each receiving the previous output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionComposite {
    functions: Vec<Function>,
}

impl FunctionComposite {
    pub fn new(functions: Vec<Function>) -> Self {
        Self { functions }
    }

    pub fn builder() -> CompositeBuilder<Function> {
        CompositeBuilder::default()
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn apply(&self, input: Value) -> OperatorResult<Value> {
        self.functions
            .iter()
            .try_fold(input, |value, f| f.apply(value))
    }
}

/// Binary operators folded in sequence into one state.
///
/// With adapted members every binding owns its own slot of the state record, so different
/// fields of one record are aggregated by different operators in a single pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryOperatorComposite {
    operators: Vec<BinaryOperator>,
}

impl BinaryOperatorComposite {
    pub fn new(operators: Vec<BinaryOperator>) -> Self {
        Self { operators }
    }

    pub fn builder() -> CompositeBuilder<BinaryOperator> {
        CompositeBuilder::default()
    }

    pub fn operators(&self) -> &[BinaryOperator] {
        &self.operators
    }

    /// State slots of every member, nested composites included.
    pub fn state_keys(&self) -> Vec<&Key> {
        self.operators
            .iter()
            .flat_map(BinaryOperator::state_keys)
            .collect()
    }

    /// Fold `input` into `state` through every member in order.
    ///
    /// A `Null` state starts from a copy of the input record with every member's state slot
    /// emptied, so the first record is folded exactly once.
    pub fn apply(&self, state: Value, input: Value) -> OperatorResult<Value> {
        if input.is_null() {
            return Ok(state);
        }
        let state = match (state, &input) {
            (Value::Null, Value::Tuple(record)) => {
                let mut fresh = record.clone();
                for key in self.state_keys() {
                    fresh.put(key, Value::Null)?;
                }
                Value::Tuple(fresh)
            }
            (state, _) => state,
        };
        self.operators
            .iter()
            .try_fold(state, |state, op| op.apply(state, input.clone()))
    }

    /// Combine two partial states, each member merging its own slots.
    pub fn merge(&self, left: Value, right: Value) -> OperatorResult<Value> {
        match (left, right) {
            (Value::Null, right) => Ok(right),
            (left, Value::Null) => Ok(left),
            (left, right) => self
                .operators
                .iter()
                .try_fold(left, |state, op| op.merge(state, right.clone())),
        }
    }
}

/// A unit that can be bound to tuple keys by [`CompositeBuilder`].
pub trait Bindable: Sized {
    fn bind(selection: Selection, unit: Self, projection: Option<Selection>) -> OperatorResult<Self>;
}

impl Bindable for Function {
    fn bind(selection: Selection, unit: Self, projection: Option<Selection>) -> OperatorResult<Self> {
        AdaptedFunction::new(selection, unit, projection).map(|a| Self::Adapted(Box::new(a)))
    }
}

impl Bindable for BinaryOperator {
    fn bind(selection: Selection, unit: Self, projection: Option<Selection>) -> OperatorResult<Self> {
        AdaptedBinaryOperator::new(selection, unit, projection).map(|a| Self::Adapted(Box::new(a)))
    }
}

struct PendingBinding<U> {
    selection: Vec<Key>,
    unit: U,
    projection: Option<Vec<Key>>,
}

/// Builds a composite of adapted members: `select(keys).execute(unit)[.project(keys)]`,
/// repeated, then `build()`. Errors surface at `build()`.
pub struct CompositeBuilder<U> {
    bindings: Vec<PendingBinding<U>>,
    selected: Option<Vec<Key>>,
    error: Option<OperatorError>,
}

impl<U> Default for CompositeBuilder<U> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
            selected: None,
            error: None,
        }
    }
}

impl<U: Bindable> CompositeBuilder<U> {
    /// Keys the next executed unit reads.
    pub fn select<K: Into<Key>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.selected = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn execute(mut self, unit: U) -> Self {
        match self.selected.take() {
            Some(selection) => self.bindings.push(PendingBinding {
                selection,
                unit,
                projection: None,
            }),
            None => self.fail("execute() called without a preceding select()"),
        }
        self
    }

    /// Keys the last executed unit writes.
    pub fn project<K: Into<Key>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        let keys: Vec<Key> = keys.into_iter().map(Into::into).collect();
        match self.bindings.last_mut() {
            Some(binding) => binding.projection = Some(keys),
            None => self.fail("project() called before any execute()"),
        }
        self
    }

    fn fail(&mut self, message: &str) {
        if self.error.is_none() {
            self.error = Some(OperatorError::configuration(message));
        }
    }

    fn bound_members(self) -> OperatorResult<Vec<U>> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.selected.is_some() {
            return Err(OperatorError::configuration(
                "select() was not followed by execute()",
            ));
        }
        self.bindings
            .into_iter()
            .map(|b| {
                let projection = b.projection.map(Selection::try_from).transpose()?;
                U::bind(Selection::try_from(b.selection)?, b.unit, projection)
            })
            .collect()
    }
}

impl CompositeBuilder<Function> {
    pub fn build(self) -> OperatorResult<FunctionComposite> {
        self.bound_members().map(FunctionComposite::new)
    }
}

impl CompositeBuilder<BinaryOperator> {
    pub fn build(self) -> OperatorResult<BinaryOperatorComposite> {
        self.bound_members().map(BinaryOperatorComposite::new)
    }
}

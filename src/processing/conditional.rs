//! The `If` predicate.
//!
//! `If` picks one of two branch predicates from a controlling outcome and returns that
//! branch's answer. The outcome comes from a static `condition` when one is set, else from
//! the controlling `predicate`, else it is `false`. A missing branch answers `false`.
//!
//! `If` never special-cases a `Null` input: it is handed to the controlling predicate and
//! then to the chosen branch, whose own null policy decides the result.

use serde::{Deserialize, Serialize};

use crate::error::OperatorResult;
use crate::tuple::{Key, Selection};
use crate::types::Value;

use super::adapter::AdaptedPredicate;
use super::predicate::Predicate;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct If {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    condition: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    predicate: Option<Box<Predicate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    then: Option<Box<Predicate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    otherwise: Option<Box<Predicate>>,
}

impl If {
    /// An `If` driven by a fixed outcome.
    pub fn new(condition: bool, then: Predicate, otherwise: Predicate) -> Self {
        Self {
            condition: Some(condition),
            then: Some(Box::new(then)),
            otherwise: Some(Box::new(otherwise)),
            ..Self::default()
        }
    }

    /// An `If` whose outcome is `predicate` tested against the input.
    pub fn with_predicate(predicate: Predicate, then: Predicate, otherwise: Predicate) -> Self {
        Self {
            predicate: Some(Box::new(predicate)),
            then: Some(Box::new(then)),
            otherwise: Some(Box::new(otherwise)),
            ..Self::default()
        }
    }

    pub fn builder() -> IfBuilder {
        IfBuilder::default()
    }

    /// Builder binding each predicate to tuple keys.
    pub fn selected_builder() -> SelectedIfBuilder {
        SelectedIfBuilder::default()
    }

    pub fn condition(&self) -> Option<bool> {
        self.condition
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_deref()
    }

    pub fn then(&self) -> Option<&Predicate> {
        self.then.as_deref()
    }

    pub fn otherwise(&self) -> Option<&Predicate> {
        self.otherwise.as_deref()
    }

    pub fn test(&self, input: &Value) -> bool {
        let outcome = match (self.condition, &self.predicate) {
            (Some(condition), _) => condition,
            (None, Some(predicate)) => predicate.test(input),
            (None, None) => false,
        };
        let branch = if outcome { &self.then } else { &self.otherwise };
        branch.as_ref().is_some_and(|p| p.test(input))
    }
}

impl From<If> for Predicate {
    fn from(conditional: If) -> Self {
        Predicate::If(conditional)
    }
}

#[derive(Debug, Default)]
pub struct IfBuilder {
    inner: If,
}

impl IfBuilder {
    pub fn condition(mut self, condition: bool) -> Self {
        self.inner.condition = Some(condition);
        self
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.inner.predicate = Some(Box::new(predicate));
        self
    }

    pub fn then(mut self, then: Predicate) -> Self {
        self.inner.then = Some(Box::new(then));
        self
    }

    pub fn otherwise(mut self, otherwise: Predicate) -> Self {
        self.inner.otherwise = Some(Box::new(otherwise));
        self
    }

    pub fn build(self) -> If {
        self.inner
    }
}

/// Builds an `If` whose controlling and branch predicates each read their own tuple keys.
///
/// Binding errors (an empty key list, an arity mismatch) are kept until `build()`.
#[derive(Debug, Default)]
pub struct SelectedIfBuilder {
    predicate: Option<OperatorResult<Predicate>>,
    then: Option<OperatorResult<Predicate>>,
    otherwise: Option<OperatorResult<Predicate>>,
}

fn bind<K: Into<Key>>(
    predicate: Predicate,
    keys: impl IntoIterator<Item = K>,
) -> OperatorResult<Predicate> {
    let selection = Selection::new(keys)?;
    Ok(Predicate::Adapted(Box::new(AdaptedPredicate::new(
        selection, predicate,
    )?)))
}

impl SelectedIfBuilder {
    pub fn predicate<K: Into<Key>>(
        mut self,
        predicate: Predicate,
        keys: impl IntoIterator<Item = K>,
    ) -> Self {
        self.predicate = Some(bind(predicate, keys));
        self
    }

    pub fn then<K: Into<Key>>(mut self, then: Predicate, keys: impl IntoIterator<Item = K>) -> Self {
        self.then = Some(bind(then, keys));
        self
    }

    pub fn otherwise<K: Into<Key>>(
        mut self,
        otherwise: Predicate,
        keys: impl IntoIterator<Item = K>,
    ) -> Self {
        self.otherwise = Some(bind(otherwise, keys));
        self
    }

    pub fn build(self) -> OperatorResult<If> {
        let boxed = |slot: Option<OperatorResult<Predicate>>| slot.transpose().map(|p| p.map(Box::new));
        Ok(If {
            condition: None,
            predicate: boxed(self.predicate)?,
            then: boxed(self.then)?,
            otherwise: boxed(self.otherwise)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::If;
    use crate::error::OperatorError;
    use crate::processing::predicate::Predicate;
    use crate::tuple::Tuple;
    use crate::types::{Value, ValueType};

    fn controlled() -> If {
        If::with_predicate(
            Predicate::is_less_than(3i32),
            Predicate::is_equal(2i32),
            Predicate::is_in([3i32, 4, 5]),
        )
    }

    #[test]
    fn static_condition_selects_then() {
        let conditional = If::new(
            true,
            Predicate::is_a(ValueType::Utf8),
            Predicate::is_a(ValueType::Int32),
        );
        assert!(conditional.test(&Value::from("test value")));
        assert!(!conditional.test(&Value::from(6i32)));
    }

    #[test]
    fn controlling_predicate_selects_a_branch() {
        assert!(controlled().test(&Value::from(2i32)));
        assert!(controlled().test(&Value::from(4i32)));

        let strict = If::with_predicate(
            Predicate::is_less_than(3i32),
            Predicate::is_equal(1i32),
            Predicate::is_in([3i32, 4, 5]),
        );
        assert!(!strict.test(&Value::from(2i32)));
    }

    #[test]
    fn failing_branch_rejects() {
        let conditional = If::with_predicate(
            Predicate::is_a(ValueType::List),
            Predicate::is_a(ValueType::Int32),
            Predicate::is_a(ValueType::Utf8),
        );
        assert!(!conditional.test(&Value::List(vec![])));
    }

    #[test]
    fn unconfigured_parts_reject() {
        assert!(!If::default().test(&Value::from("test value")));
        assert!(
            !If::builder()
                .then(Predicate::is_a(ValueType::Utf8))
                .build()
                .test(&Value::from("testValue"))
        );
        assert!(
            !If::builder()
                .predicate(Predicate::Exists)
                .build()
                .test(&Value::from("testValue"))
        );
    }

    #[test]
    fn null_input_reaches_the_branches() {
        let conditional = If::builder()
            .predicate(Predicate::is_less_than(3i32))
            .then(Predicate::is_in([0i32, 1, 2]))
            .build();
        assert!(!conditional.test(&Value::Null));

        let accepts_null = If::builder()
            .condition(false)
            .otherwise(Predicate::negate(Predicate::Exists))
            .build();
        assert!(accepts_null.test(&Value::Null));
    }

    #[test]
    fn selected_builder_binds_fields() {
        let conditional = If::selected_builder()
            .predicate(Predicate::is_a(ValueType::Utf8), [0usize])
            .then(Predicate::string_contains("test"), [1usize])
            .otherwise(Predicate::is_more_than(3i32), [2usize])
            .build()
            .unwrap();
        let record = Tuple::new(vec![Value::from("prop"), Value::from("test"), Value::from(4i32)]);
        assert!(conditional.test(&Value::Tuple(record)));

        let pairwise = If::selected_builder()
            .predicate(Predicate::is_a(ValueType::Utf8), [0usize])
            .then(Predicate::IsXLessThanY, [1usize, 2])
            .otherwise(Predicate::IsXMoreThanY, [1usize, 2])
            .build()
            .unwrap();
        let record = Tuple::new(vec![
            Value::from("prop"),
            Value::from("test"),
            Value::from("testValue"),
        ]);
        assert!(pairwise.test(&Value::Tuple(record)));
    }

    #[test]
    fn selected_builder_reports_arity_errors() {
        let err = If::selected_builder()
            .then(Predicate::IsXLessThanY, [1usize])
            .build()
            .unwrap_err();
        assert!(matches!(err, OperatorError::Configuration { .. }));
    }
}

//! Predicates.
//!
//! Every bundled predicate answers `false` for a `Null` input; `Not` negates its delegate's
//! answer. Ordering comparisons only succeed between values of the same numeric kind,
//! between strings, or between booleans.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{Value, ValueType};

use super::adapter::AdaptedPredicate;
use super::conditional::If;

/// Closed set of configurable predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum Predicate {
    /// Accepts any non-null value.
    #[serde(rename = "predicate.Exists")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.Exists")]
    Exists,
    #[serde(rename = "predicate.IsA")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.IsA")]
    IsA {
        #[serde(rename = "type")]
        value_type: ValueType,
    },
    #[serde(rename = "predicate.IsEqual")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.IsEqual")]
    IsEqual { value: Value },
    #[serde(rename = "predicate.IsLessThan")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.IsLessThan")]
    IsLessThan {
        value: Value,
        #[serde(rename = "orEqualTo", default)]
        or_equal_to: bool,
    },
    #[serde(rename = "predicate.IsMoreThan")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.IsMoreThan")]
    IsMoreThan {
        value: Value,
        #[serde(rename = "orEqualTo", default)]
        or_equal_to: bool,
    },
    #[serde(rename = "predicate.IsIn")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.IsIn")]
    IsIn { values: Vec<Value> },
    /// Tests a pair `(x, y)` for `x < y`.
    #[serde(rename = "predicate.IsXLessThanY")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.IsXLessThanY")]
    IsXLessThanY,
    /// Tests a pair `(x, y)` for `x > y`.
    #[serde(rename = "predicate.IsXMoreThanY")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.IsXMoreThanY")]
    IsXMoreThanY,
    #[serde(rename = "predicate.StringContains")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.StringContains")]
    StringContains {
        value: String,
        #[serde(rename = "ignoreCase", default)]
        ignore_case: bool,
    },
    #[serde(rename = "predicate.Not")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.Not")]
    Not { predicate: Box<Predicate> },
    /// Accepts when every member accepts. Empty accepts.
    #[serde(rename = "predicate.And")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.And")]
    And { predicates: Vec<Predicate> },
    /// Accepts when any member accepts. Empty rejects.
    #[serde(rename = "predicate.Or")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.Or")]
    Or { predicates: Vec<Predicate> },
    #[serde(rename = "predicate.If")]
    #[serde(alias = "uk.gov.gchq.koryphe.impl.predicate.If")]
    If(If),
    #[serde(rename = "tuple.AdaptedPredicate")]
    #[serde(alias = "uk.gov.gchq.koryphe.tuple.predicate.TupleAdaptedPredicate")]
    Adapted(Box<AdaptedPredicate>),
}

impl Predicate {
    pub fn is_a(value_type: ValueType) -> Self {
        Self::IsA { value_type }
    }

    pub fn is_equal(value: impl Into<Value>) -> Self {
        Self::IsEqual {
            value: value.into(),
        }
    }

    pub fn is_less_than(value: impl Into<Value>) -> Self {
        Self::IsLessThan {
            value: value.into(),
            or_equal_to: false,
        }
    }

    pub fn is_more_than(value: impl Into<Value>) -> Self {
        Self::IsMoreThan {
            value: value.into(),
            or_equal_to: false,
        }
    }

    pub fn is_in<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::IsIn {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn string_contains(value: impl Into<String>) -> Self {
        Self::StringContains {
            value: value.into(),
            ignore_case: false,
        }
    }

    pub fn negate(predicate: Predicate) -> Self {
        Self::Not {
            predicate: Box::new(predicate),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Exists => "Exists",
            Self::IsA { .. } => "IsA",
            Self::IsEqual { .. } => "IsEqual",
            Self::IsLessThan { .. } => "IsLessThan",
            Self::IsMoreThan { .. } => "IsMoreThan",
            Self::IsIn { .. } => "IsIn",
            Self::IsXLessThanY => "IsXLessThanY",
            Self::IsXMoreThanY => "IsXMoreThanY",
            Self::StringContains { .. } => "StringContains",
            Self::Not { .. } => "Not",
            Self::And { .. } => "And",
            Self::Or { .. } => "Or",
            Self::If(_) => "If",
            Self::Adapted(_) => "AdaptedPredicate",
        }
    }

    /// Number of projected fields this predicate tests, if fixed.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::IsXLessThanY | Self::IsXMoreThanY => Some(2),
            Self::IsEqual { .. }
            | Self::IsLessThan { .. }
            | Self::IsMoreThan { .. }
            | Self::IsIn { .. }
            | Self::StringContains { .. } => Some(1),
            Self::Not { predicate } => predicate.arity(),
            _ => None,
        }
    }

    pub fn test(&self, input: &Value) -> bool {
        match self {
            Self::Not { predicate } => !predicate.test(input),
            Self::If(conditional) => conditional.test(input),
            Self::Adapted(adapted) => adapted.test(input),
            Self::And { predicates } => predicates.iter().all(|p| p.test(input)),
            Self::Or { predicates } => predicates.iter().any(|p| p.test(input)),
            _ if input.is_null() => false,
            Self::Exists => true,
            Self::IsA { value_type } => value_type.matches(input),
            Self::IsEqual { value } => input == value,
            Self::IsLessThan { value, or_equal_to } => {
                matches_ordering(input.partial_cmp(value), Ordering::Less, *or_equal_to)
            }
            Self::IsMoreThan { value, or_equal_to } => {
                matches_ordering(input.partial_cmp(value), Ordering::Greater, *or_equal_to)
            }
            Self::IsIn { values } => values.contains(input),
            Self::IsXLessThanY => compare_pair(input) == Some(Ordering::Less),
            Self::IsXMoreThanY => compare_pair(input) == Some(Ordering::Greater),
            Self::StringContains { value, ignore_case } => match input {
                Value::Utf8(s) if *ignore_case => s.to_lowercase().contains(&value.to_lowercase()),
                Value::Utf8(s) => s.contains(value.as_str()),
                _ => false,
            },
        }
    }
}

fn matches_ordering(actual: Option<Ordering>, wanted: Ordering, or_equal_to: bool) -> bool {
    match actual {
        Some(o) if o == wanted => true,
        Some(Ordering::Equal) => or_equal_to,
        _ => false,
    }
}

fn compare_pair(input: &Value) -> Option<Ordering> {
    let (x, y) = match input {
        Value::Tuple(t) if t.len() == 2 => {
            let mut values = t.values();
            (values.next()?, values.next()?)
        }
        Value::List(items) if items.len() == 2 => (&items[0], &items[1]),
        _ => return None,
    };
    if x.is_null() || y.is_null() {
        return None;
    }
    x.partial_cmp(y)
}

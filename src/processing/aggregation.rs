//! Strict-kind numeric folding.
//!
//! A fold chain adopts the [`NumericKind`] of the first non-null number it sees and rejects
//! every later number of a different kind. The state of a chain is an explicit
//! [`AggregationState`] value owned by the caller; reducers never hold it.

use crate::error::{OperatorError, OperatorResult};
use crate::types::{Number, NumericKind, Value};

/// Accumulated value of one fold chain. Unset until the first non-null input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregationState {
    value: Option<Number>,
}

impl AggregationState {
    pub fn unset() -> Self {
        Self::default()
    }

    /// Kind the chain is locked to, if any value has been folded.
    pub fn kind(&self) -> Option<NumericKind> {
        self.value.as_ref().map(Number::kind)
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&Number> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<Number> {
        self.value
    }

    /// Read a state slot from a record field: `Null` is unset, a number is a locked state.
    pub fn from_value(value: &Value, unit: &'static str) -> OperatorResult<Self> {
        match value {
            Value::Null => Ok(Self::unset()),
            Value::Number(n) => Ok(Self::from(n.clone())),
            other => Err(OperatorError::UnsupportedValue {
                unit,
                found: other.type_name(),
            }),
        }
    }

    pub fn into_field(self) -> Value {
        self.value.map_or(Value::Null, Value::Number)
    }
}

impl From<Number> for AggregationState {
    fn from(n: Number) -> Self {
        Self { value: Some(n) }
    }
}

/// Enforces that every number folded into a chain shares the chain's kind.
///
/// Kinds are never promoted: an `Int32` chain stays `Int32` for its whole lifetime.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericTypeLock;

impl NumericTypeLock {
    /// Kind the chain will be locked to after folding `input` into `state`.
    pub fn lock(state: &AggregationState, input: &Number) -> OperatorResult<NumericKind> {
        match state.kind() {
            None => Ok(input.kind()),
            Some(locked) => {
                Self::check(locked, input.kind())?;
                Ok(locked)
            }
        }
    }

    pub fn check(locked: NumericKind, found: NumericKind) -> OperatorResult<()> {
        if locked == found {
            Ok(())
        } else {
            Err(OperatorError::TypeMismatch {
                expected: locked,
                found,
            })
        }
    }
}

/// Arithmetic of the numeric reducing operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericReducer {
    /// Addition; fixed-width integers saturate.
    Sum,
    /// Multiplication; fixed-width integers saturate.
    Product,
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
}

impl NumericReducer {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sum => "Sum",
            Self::Product => "Product",
            Self::Min => "Min",
            Self::Max => "Max",
        }
    }

    /// Fold one input into `current`.
    ///
    /// - `None` input returns `current` unchanged.
    /// - An unset state adopts the input and its kind.
    /// - A set state requires an input of the same kind, otherwise
    ///   [`OperatorError::TypeMismatch`] is returned and `current` is untouched.
    pub fn combine(
        self,
        current: &AggregationState,
        input: Option<&Number>,
    ) -> OperatorResult<AggregationState> {
        let Some(input) = input else {
            return Ok(current.clone());
        };
        NumericTypeLock::lock(current, input)?;
        match current.value() {
            None => Ok(AggregationState::from(input.clone())),
            Some(acc) => self.apply(acc, input).map(AggregationState::from),
        }
    }

    /// Fold a whole chain starting from an unset state.
    pub fn fold<I>(self, inputs: I) -> OperatorResult<AggregationState>
    where
        I: IntoIterator<Item = Option<Number>>,
    {
        inputs
            .into_iter()
            .try_fold(AggregationState::unset(), |state, input| {
                self.combine(&state, input.as_ref())
            })
    }

    fn apply(self, acc: &Number, input: &Number) -> OperatorResult<Number> {
        macro_rules! fixed {
            ($a:expr, $b:expr) => {
                match self {
                    Self::Sum => $a.saturating_add(*$b),
                    Self::Product => $a.saturating_mul(*$b),
                    Self::Min => *$a.min($b),
                    Self::Max => *$a.max($b),
                }
            };
        }
        macro_rules! float {
            ($a:expr, $b:expr) => {
                match self {
                    Self::Sum => $a + $b,
                    Self::Product => $a * $b,
                    Self::Min => $a.min(*$b),
                    Self::Max => $a.max(*$b),
                }
            };
        }
        macro_rules! big {
            ($a:expr, $b:expr) => {
                match self {
                    Self::Sum => $a + $b,
                    Self::Product => $a * $b,
                    Self::Min => $a.min($b).clone(),
                    Self::Max => $a.max($b).clone(),
                }
            };
        }

        Ok(match (acc, input) {
            (Number::Int16(a), Number::Int16(b)) => Number::Int16(fixed!(a, b)),
            (Number::Int32(a), Number::Int32(b)) => Number::Int32(fixed!(a, b)),
            (Number::Int64(a), Number::Int64(b)) => Number::Int64(fixed!(a, b)),
            (Number::Float32(a), Number::Float32(b)) => Number::Float32(float!(a, b)),
            (Number::Float64(a), Number::Float64(b)) => Number::Float64(float!(a, b)),
            (Number::BigInteger(a), Number::BigInteger(b)) => Number::BigInteger(big!(a, b)),
            (Number::BigDecimal(a), Number::BigDecimal(b)) => Number::BigDecimal(big!(a, b)),
            (a, b) => {
                return Err(OperatorError::TypeMismatch {
                    expected: a.kind(),
                    found: b.kind(),
                });
            }
        })
    }
}

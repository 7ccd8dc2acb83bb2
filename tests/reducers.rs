use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use rust_data_operators::processing::{AggregationState, BinaryOperator, NumericReducer};
use rust_data_operators::types::{Number, NumericKind, Value};
use rust_data_operators::OperatorError;

fn assert_mismatch(result: Result<Value, OperatorError>, expected: NumericKind, found: NumericKind) {
    match result {
        Err(OperatorError::TypeMismatch {
            expected: e,
            found: f,
        }) => {
            assert_eq!((e, f), (expected, found));
        }
        other => panic!("expected a type mismatch, got {other:?}"),
    }
}

#[test]
fn sum_of_shorts_saturates_at_max() {
    let sum = BinaryOperator::Sum;
    let mut state = Value::Null;
    for (input, expected) in [(1i16, 1i16), (3, 4), (2, 6)] {
        state = sum.apply(state, Value::from(input)).unwrap();
        assert_eq!(state, Value::from(expected));
    }

    state = sum.apply(state, Value::from(i16::MAX - 6 + 1)).unwrap();
    assert_eq!(state, Value::from(i16::MAX));
}

#[test]
fn sum_locks_to_int32() {
    let sum = BinaryOperator::Sum;
    let state = sum.apply(Value::Null, Value::from(1i32)).unwrap();
    assert_eq!(state, Value::from(1i32));

    assert_mismatch(
        sum.apply(state.clone(), Value::from(2.7f64)),
        NumericKind::Int32,
        NumericKind::Float64,
    );
    assert_mismatch(
        sum.apply(state.clone(), Value::from(1i64)),
        NumericKind::Int32,
        NumericKind::Int64,
    );

    // the rejected inputs left the chain usable
    assert_eq!(sum.apply(state, Value::from(5i32)).unwrap(), Value::from(6i32));
}

#[test]
fn sum_locks_to_int64() {
    let sum = BinaryOperator::Sum;
    let state = Value::from(0i64);
    assert_mismatch(
        sum.apply(state.clone(), Value::from(1i32)),
        NumericKind::Int64,
        NumericKind::Int32,
    );

    let state = sum.apply(state, Value::from(3i64)).unwrap();
    assert_eq!(state, Value::from(3i64));
    assert_mismatch(
        sum.apply(state, Value::from(2.5f64)),
        NumericKind::Int64,
        NumericKind::Float64,
    );
}

#[test]
fn sum_of_floats_and_doubles() {
    let floats = BinaryOperator::Sum
        .fold([1.1f32, 2f32, 1.5f32].map(Value::from))
        .unwrap();
    assert_eq!(floats, Value::from(4.6f32));

    let doubles = BinaryOperator::Sum
        .fold([1.1f64, 2.1, 1.5].map(Value::from))
        .unwrap();
    assert_eq!(doubles, Value::from(4.7f64));

    assert_mismatch(
        BinaryOperator::Sum.apply(Value::from(0f64), Value::from(1i32)),
        NumericKind::Float64,
        NumericKind::Int32,
    );
}

#[test]
fn null_inputs_are_no_ops() {
    let sum = BinaryOperator::Sum;
    assert_eq!(sum.apply(Value::Null, Value::Null).unwrap(), Value::Null);

    let state = sum.apply(Value::Null, Value::from(1i32)).unwrap();
    let state = sum.apply(state, Value::Null).unwrap();
    assert_eq!(state, Value::from(1i32));
}

#[test]
fn product_min_and_max_share_the_lock() {
    let inputs = || [7i64, 2, 9].map(Value::from);
    assert_eq!(BinaryOperator::Product.fold(inputs()).unwrap(), Value::from(126i64));
    assert_eq!(BinaryOperator::Min.fold(inputs()).unwrap(), Value::from(2i64));
    assert_eq!(BinaryOperator::Max.fold(inputs()).unwrap(), Value::from(9i64));

    for op in [BinaryOperator::Product, BinaryOperator::Min, BinaryOperator::Max] {
        assert_mismatch(
            op.apply(Value::from(1i16), Value::from(1i32)),
            NumericKind::Int16,
            NumericKind::Int32,
        );
    }
}

#[test]
fn product_saturates_at_min() {
    let product = BinaryOperator::Product
        .fold([Value::from(i32::MIN / 2), Value::from(3i32)])
        .unwrap();
    assert_eq!(product, Value::from(i32::MIN));
}

#[test]
fn big_kinds_are_exact() {
    let big = |s: &str| Value::from(BigInt::from_str(s).unwrap());
    let total = BinaryOperator::Sum
        .fold([big("9223372036854775807"), big("9223372036854775807")])
        .unwrap();
    assert_eq!(total, big("18446744073709551614"));

    let dec = |s: &str| Value::from(BigDecimal::from_str(s).unwrap());
    let total = BinaryOperator::Sum.fold([dec("0.1"), dec("0.2")]).unwrap();
    assert_eq!(total, dec("0.3"));
    assert_mismatch(
        BinaryOperator::Max.apply(dec("1"), big("1")),
        NumericKind::BigDecimal,
        NumericKind::BigInteger,
    );
}

#[test]
fn reducer_state_is_left_untouched_on_mismatch() {
    let state = NumericReducer::Sum
        .fold([Some(Number::from(4i32)), None, Some(Number::from(5i32))])
        .unwrap();
    assert_eq!(state.kind(), Some(NumericKind::Int32));

    let err = NumericReducer::Sum
        .combine(&state, Some(&Number::from(1.0f32)))
        .unwrap_err();
    assert!(err.to_string().contains("Int32"));
    assert_eq!(state.value(), Some(&Number::from(9i32)));
    assert!(!AggregationState::unset().is_set());
}

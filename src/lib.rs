//! `rust-data-operators` is a library of small, serialisable units (functions, predicates
//! and reducing operators) that a record pipeline configures and applies to tuples.
//!
//! ## What it provides
//!
//! - **Strict-kind numeric folds**: [`processing::BinaryOperator::Sum`], `Product`, `Min` and
//!   `Max` lock onto the numeric kind of the first non-null value they see. Folding another
//!   kind into that chain fails with [`OperatorError::TypeMismatch`] rather than coercing.
//!   Fixed-width integers saturate instead of wrapping.
//! - **Tuple adapters** ([`processing::adapter`]): bind any unit to selected fields of a
//!   [`tuple::Tuple`], optionally writing the result back to other fields.
//! - **Composites** ([`processing::composite`]): run several adapted units in order over
//!   the same record.
//! - **Conditionals** ([`processing::If`]): pick a branch predicate from a static condition
//!   or a controlling predicate.
//! - **JSON configuration** ([`config`]): every unit round-trips through a tagged document.
//! - **Parallel execution** ([`execution`]): apply, filter and fold large record slices on
//!   a rayon pool with throttling, metrics and observer hooks.
//!
//! ## Values
//!
//! Units operate on [`types::Value`]: `Null`, booleans, strings, lists, tuples and the
//! numeric kinds of [`types::Number`] (`Int16`, `Int32`, `Int64`, `Float32`, `Float64`,
//! `BigInteger`, `BigDecimal`). `Null` is an absent value: operators skip it, functions
//! mostly pass it through and predicates reject it.
//!
//! ## Example: sum with a kind lock
//!
//! ```rust
//! use rust_data_operators::processing::BinaryOperator;
//! use rust_data_operators::types::Value;
//! use rust_data_operators::OperatorError;
//!
//! let total = BinaryOperator::Sum
//!     .fold([Value::from(1i64), Value::Null, Value::from(2i64)])
//!     .unwrap();
//! assert_eq!(total, Value::from(3i64));
//!
//! let err = BinaryOperator::Sum
//!     .fold([Value::from(1i64), Value::from(2i32)])
//!     .unwrap_err();
//! assert!(matches!(err, OperatorError::TypeMismatch { .. }));
//! ```
//!
//! ## Example: a conditional over tuple fields
//!
//! ```rust
//! use rust_data_operators::processing::{If, Predicate};
//! use rust_data_operators::tuple::Tuple;
//! use rust_data_operators::types::{Value, ValueType};
//!
//! let conditional = If::selected_builder()
//!     .predicate(Predicate::is_a(ValueType::Utf8), [0usize])
//!     .then(Predicate::string_contains("test"), [1usize])
//!     .otherwise(Predicate::is_more_than(3i32), [2usize])
//!     .build()
//!     .unwrap();
//!
//! let record = Tuple::new(vec![Value::from("prop"), Value::from("test"), Value::from(4i32)]);
//! assert!(conditional.test(&Value::Tuple(record)));
//! ```
//!
//! ## Modules
//!
//! - [`types`]: values and numeric kinds
//! - [`tuple`]: tuples, keys and selections
//! - [`processing`]: functions, predicates, operators, adapters, composites, `If`
//! - [`config`]: JSON documents for configured units
//! - [`execution`]: parallel engine with metrics and observers
//! - [`error`]: the shared error type

pub mod config;
pub mod error;
pub mod execution;
pub mod processing;
pub mod tuple;
pub mod types;

pub use error::{OperatorError, OperatorResult};

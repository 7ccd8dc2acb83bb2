//! Configurable units over [`crate::types::Value`]s.
//!
//! Three kinds of unit are provided, each as a closed, serialisable enum:
//!
//! - [`Function`]: `Value -> Value`
//! - [`Predicate`]: `&Value -> bool`
//! - [`BinaryOperator`]: `(state, input) -> state`
//!
//! Units are bound to the fields of a [`crate::tuple::Tuple`] with the adapters in
//! [`adapter`], chained with the composites in [`composite`], and branched with [`If`].
//!
//! ## Example: aggregate three fields of a record stream
//!
//! ```rust
//! use rust_data_operators::processing::{BinaryOperator, BinaryOperatorComposite};
//! use rust_data_operators::tuple::Tuple;
//! use rust_data_operators::types::Value;
//!
//! let composite = BinaryOperatorComposite::builder()
//!     .select(["A"])
//!     .execute(BinaryOperator::Product)
//!     .select(["B"])
//!     .execute(BinaryOperator::Sum)
//!     .build()
//!     .unwrap();
//!
//! let records = [(1i32, 2i32), (4, 5), (7, 8)]
//!     .map(|(a, b)| Value::Tuple(Tuple::named([("A", a), ("B", b)])));
//! let totals = BinaryOperator::Composite(composite).fold(records).unwrap();
//! assert_eq!(totals, Value::Tuple(Tuple::named([("A", 28i32), ("B", 15i32)])));
//! ```

pub mod adapter;
pub mod aggregation;
pub mod binary_operator;
pub mod composite;
pub mod conditional;
pub mod function;
pub mod predicate;

pub use adapter::{AdaptedBinaryOperator, AdaptedFunction, AdaptedPredicate};
pub use aggregation::{AggregationState, NumericReducer, NumericTypeLock};
pub use binary_operator::{BinaryOperator, StringConcat};
pub use composite::{BinaryOperatorComposite, CompositeBuilder, FunctionComposite};
pub use conditional::{If, IfBuilder, SelectedIfBuilder};
pub use function::{DefaultIfEmpty, Function, Length, MultiplyBy, MultiplyLongBy};
pub use predicate::Predicate;

use thiserror::Error;

use crate::types::NumericKind;

/// Convenience result type for operator, function and adapter calls.
pub type OperatorResult<T> = Result<T, OperatorError>;

/// Error type returned by configured units.
///
/// A single enum shared by reducing operators, functions, adapters and the execution engine.
#[derive(Debug, Error)]
pub enum OperatorError {
    /// A fold chain locked to one numeric kind received a value of another kind.
    #[error("type mismatch: fold is locked to {expected} but received {found}")]
    TypeMismatch {
        expected: NumericKind,
        found: NumericKind,
    },

    /// A selection, projection or option does not fit the unit it is bound to.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A unit received a non-null value it has no defined behaviour for.
    #[error("{unit} does not accept {found} values")]
    UnsupportedValue { unit: &'static str, found: &'static str },

    /// A configuration document could not be encoded or decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OperatorError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

//! JSON configuration documents.
//!
//! Every unit serialises to a tagged document, `{"class": "<name>", ...fields}`, with
//! nested units embedded as nested documents. Selections are JSON arrays of positions
//! (`0`) or field names (`"A"`).
//!
//! ```rust
//! use rust_data_operators::config;
//! use rust_data_operators::processing::Predicate;
//! use rust_data_operators::types::Value;
//!
//! let json = r#"{"class": "predicate.IsLessThan", "value": 3, "orEqualTo": true}"#;
//! let predicate: Predicate = config::from_json(json).unwrap();
//! assert!(predicate.test(&Value::from(3i32)));
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::OperatorResult;

/// Serialise a unit (or any configuration value) to compact JSON.
pub fn to_json<T: Serialize>(unit: &T) -> OperatorResult<String> {
    Ok(serde_json::to_string(unit)?)
}

/// Serialise to indented JSON, as configuration files are usually kept.
pub fn to_json_pretty<T: Serialize>(unit: &T) -> OperatorResult<String> {
    Ok(serde_json::to_string_pretty(unit)?)
}

/// Parse a configuration document.
///
/// Construction-time checks (selection arity, empty selections) run during parsing, so a
/// malformed document is rejected here rather than on first use.
pub fn from_json<T: DeserializeOwned>(json: &str) -> OperatorResult<T> {
    Ok(serde_json::from_str(json)?)
}

/// Decode from an already parsed document, e.g. one embedded in a larger configuration.
pub fn from_json_value<T: DeserializeOwned>(value: serde_json::Value) -> OperatorResult<T> {
    Ok(serde_json::from_value(value)?)
}

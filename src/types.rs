//! Core data model types.
//!
//! Every unit in this crate consumes and produces [`Value`]s. Records are [`Value::Tuple`]s,
//! and numbers carry their concrete representation ([`NumericKind`]) so that folds can
//! enforce a single kind per chain.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::tuple::Tuple;

/// Concrete numeric representation of a [`Number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericKind {
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point number.
    Float32,
    /// 64-bit floating point number.
    Float64,
    /// Arbitrary precision integer.
    BigInteger,
    /// Arbitrary precision decimal.
    BigDecimal,
}

impl NumericKind {
    /// Stable name of this kind, as used in configuration documents.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::BigInteger => "BigInteger",
            Self::BigDecimal => "BigDecimal",
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A number tagged with its concrete representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    BigInteger(BigInt),
    BigDecimal(BigDecimal),
}

impl Number {
    /// The concrete kind of this number.
    pub fn kind(&self) -> NumericKind {
        match self {
            Self::Int16(_) => NumericKind::Int16,
            Self::Int32(_) => NumericKind::Int32,
            Self::Int64(_) => NumericKind::Int64,
            Self::Float32(_) => NumericKind::Float32,
            Self::Float64(_) => NumericKind::Float64,
            Self::BigInteger(_) => NumericKind::BigInteger,
            Self::BigDecimal(_) => NumericKind::BigDecimal,
        }
    }
}

/// Numbers only order against numbers of the same kind.
impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int16(a), Self::Int16(b)) => a.partial_cmp(b),
            (Self::Int32(a), Self::Int32(b)) => a.partial_cmp(b),
            (Self::Int64(a), Self::Int64(b)) => a.partial_cmp(b),
            (Self::Float32(a), Self::Float32(b)) => a.partial_cmp(b),
            (Self::Float64(a), Self::Float64(b)) => a.partial_cmp(b),
            (Self::BigInteger(a), Self::BigInteger(b)) => a.partial_cmp(b),
            (Self::BigDecimal(a), Self::BigDecimal(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::BigInteger(v) => write!(f, "{v}"),
            Self::BigDecimal(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! number_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Number(Number::$variant(v))
                }
            }
        )*
    };
}

number_from!(
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    BigInt => BigInteger,
    BigDecimal => BigDecimal,
);

/// A single value inside a record.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing/absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Number with a concrete kind.
    Number(Number),
    /// UTF-8 string.
    Utf8(String),
    /// Ordered collection.
    List(Vec<Value>),
    /// Nested record.
    Tuple(Tuple),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the number if this value is numeric.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&Tuple> {
        match self {
            Self::Tuple(t) => Some(t),
            _ => None,
        }
    }

    /// Name of this value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Number(n) => n.kind().name(),
            Self::Utf8(_) => "Utf8",
            Self::List(_) => "List",
            Self::Tuple(_) => "Tuple",
        }
    }
}

/// Values order within one numeric kind, strings and booleans. Everything else is only
/// comparable for equality.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b),
            (Self::Utf8(a), Self::Utf8(b)) => a.partial_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.partial_cmp(b),
            (a, b) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl From<Number> for Value {
    fn from(v: Number) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Utf8(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Tuple> for Value {
    fn from(v: Tuple) -> Self {
        Self::Tuple(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Type tests understood by the `IsA` predicate.
///
/// JVM class names are accepted as aliases, e.g. `"java.lang.String"` for `Utf8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    #[serde(alias = "java.lang.Boolean")]
    Bool,
    #[serde(alias = "java.lang.Short")]
    Int16,
    #[serde(alias = "java.lang.Integer")]
    Int32,
    #[serde(alias = "java.lang.Long")]
    Int64,
    #[serde(alias = "java.lang.Float")]
    Float32,
    #[serde(alias = "java.lang.Double")]
    Float64,
    #[serde(alias = "java.math.BigInteger")]
    BigInteger,
    #[serde(alias = "java.math.BigDecimal")]
    BigDecimal,
    /// Any numeric kind.
    #[serde(alias = "java.lang.Number")]
    Number,
    #[serde(alias = "java.lang.String")]
    Utf8,
    #[serde(alias = "java.util.List")]
    List,
    Tuple,
}

impl ValueType {
    /// Whether `value` is of this type. `Null` is never of any type.
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => false,
            (Self::Bool, Value::Bool(_)) => true,
            (Self::Number, Value::Number(_)) => true,
            (Self::Utf8, Value::Utf8(_)) => true,
            (Self::List, Value::List(_)) => true,
            (Self::Tuple, Value::Tuple(_)) => true,
            (kind, Value::Number(n)) => kind.numeric_kind() == Some(n.kind()),
            _ => false,
        }
    }

    fn numeric_kind(self) -> Option<NumericKind> {
        match self {
            Self::Int16 => Some(NumericKind::Int16),
            Self::Int32 => Some(NumericKind::Int32),
            Self::Int64 => Some(NumericKind::Int64),
            Self::Float32 => Some(NumericKind::Float32),
            Self::Float64 => Some(NumericKind::Float64),
            Self::BigInteger => Some(NumericKind::BigInteger),
            Self::BigDecimal => Some(NumericKind::BigDecimal),
            _ => None,
        }
    }
}

// Document encoding: null, booleans, strings, arrays, 32-bit integers and 64-bit floats use
// plain JSON; every other kind is a single-key object naming it, e.g. `{"Int64": 5}`.

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Utf8(v) => serializer.serialize_str(v),
            Self::List(items) => items.serialize(serializer),
            Self::Number(Number::Int32(v)) => serializer.serialize_i32(*v),
            Self::Number(Number::Float64(v)) => serializer.serialize_f64(*v),
            Self::Number(Number::Int16(v)) => single_entry(serializer, "Int16", v),
            Self::Number(Number::Int64(v)) => single_entry(serializer, "Int64", v),
            Self::Number(Number::Float32(v)) => single_entry(serializer, "Float32", v),
            Self::Number(Number::BigInteger(v)) => {
                single_entry(serializer, "BigInteger", &v.to_string())
            }
            Self::Number(Number::BigDecimal(v)) => {
                single_entry(serializer, "BigDecimal", &v.to_string())
            }
            Self::Tuple(t) => single_entry(serializer, "Tuple", t),
        }
    }
}

fn single_entry<S: Serializer, T: Serialize + ?Sized>(
    serializer: S,
    key: &str,
    value: &T,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(key, value)?;
    map.end()
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value or a single-key numeric/tuple object")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(match i32::try_from(v) {
            Ok(small) => Value::from(small),
            Err(_) => Value::from(v),
        })
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        if let Ok(small) = i32::try_from(v) {
            Ok(Value::from(small))
        } else if let Ok(wide) = i64::try_from(v) {
            Ok(Value::from(wide))
        } else {
            Ok(Value::from(BigInt::from(v)))
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::Utf8(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::Utf8(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let key: String = map
            .next_key()?
            .ok_or_else(|| de::Error::custom("expected a single-key object"))?;
        let value = match key.as_str() {
            "Int16" => Value::from(map.next_value::<i16>()?),
            "Int64" => Value::from(map.next_value::<i64>()?),
            "Float32" => Value::from(map.next_value::<f32>()?),
            "BigInteger" => {
                let raw: String = map.next_value()?;
                let parsed = BigInt::from_str(&raw).map_err(|e| {
                    de::Error::custom(format!("invalid BigInteger '{raw}': {e}"))
                })?;
                Value::from(parsed)
            }
            "BigDecimal" => {
                let raw: String = map.next_value()?;
                let parsed = BigDecimal::from_str(&raw).map_err(|e| {
                    de::Error::custom(format!("invalid BigDecimal '{raw}': {e}"))
                })?;
                Value::from(parsed)
            }
            "Tuple" => Value::Tuple(map.next_value::<Tuple>()?),
            other => {
                return Err(de::Error::unknown_field(
                    other,
                    &["Int16", "Int64", "Float32", "BigInteger", "BigDecimal", "Tuple"],
                ));
            }
        };
        if map.next_key::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::custom(format!(
                "'{key}' object must have exactly one entry"
            )));
        }
        Ok(value)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{Number, NumericKind, Value, ValueType};
    use bigdecimal::BigDecimal;
    use num_bigint::BigInt;
    use std::cmp::Ordering;
    use std::str::FromStr;

    #[test]
    fn numbers_only_compare_within_one_kind() {
        assert_eq!(
            Number::Int32(1).partial_cmp(&Number::Int32(2)),
            Some(Ordering::Less)
        );
        assert_eq!(Number::Int32(1).partial_cmp(&Number::Int64(2)), None);
        assert_ne!(Value::from(1i32), Value::from(1i64));
    }

    #[test]
    fn value_type_matches_kind_and_any_number() {
        assert!(ValueType::Int16.matches(&Value::from(3i16)));
        assert!(!ValueType::Int32.matches(&Value::from(3i16)));
        assert!(ValueType::Number.matches(&Value::from(3.5f32)));
        assert!(!ValueType::Utf8.matches(&Value::Null));
        assert_eq!(Value::from(2.0f64).type_name(), "Float64");
        assert_eq!(Number::Int16(1).kind(), NumericKind::Int16);
    }

    #[test]
    fn json_integers_decode_as_int32_unless_wider() {
        let small: Value = serde_json::from_str("7").unwrap();
        let wide: Value = serde_json::from_str("9000000000").unwrap();
        let float: Value = serde_json::from_str("2.5").unwrap();
        assert_eq!(small, Value::from(7i32));
        assert_eq!(wide, Value::from(9_000_000_000i64));
        assert_eq!(float, Value::from(2.5f64));
    }

    #[test]
    fn non_default_kinds_keep_their_kind_in_json() {
        let values = vec![
            Value::from(5i16),
            Value::from(5i64),
            Value::from(1.5f32),
            Value::from(BigInt::from(12345)),
            Value::from(BigDecimal::from_str("1.25").unwrap()),
        ];
        let json = serde_json::to_string(&Value::List(values.clone())).unwrap();
        assert_eq!(
            json,
            r#"[{"Int16":5},{"Int64":5},{"Float32":1.5},{"BigInteger":"12345"},{"BigDecimal":"1.25"}]"#
        );
        let decoded: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, Value::List(values));
    }

    #[test]
    fn unknown_wrapper_key_is_rejected() {
        let err = serde_json::from_str::<Value>(r#"{"Int8": 1}"#).unwrap_err();
        assert!(err.to_string().contains("Int8"));
    }
}

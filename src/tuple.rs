//! Records and the keys that address their fields.
//!
//! A [`Tuple`] is an ordered list of values, each optionally named. Fields are addressed by
//! [`Key`]: a position works on every tuple, a name only on named entries. A [`Selection`] is
//! the ordered, non-empty list of keys an adapter reads or writes.

use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{OperatorError, OperatorResult};
use crate::types::Value;

/// Address of a single tuple field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Position(usize),
    Name(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(i) => write!(f, "{i}"),
            Self::Name(n) => write!(f, "'{n}'"),
        }
    }
}

impl From<usize> for Key {
    fn from(v: usize) -> Self {
        Self::Position(v)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Self::Name(v.to_string())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Self::Name(v)
    }
}

/// Ordered, non-empty list of keys.
///
/// The order defines how the selected fields bind to a unit's arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Key>", into = "Vec<Key>")]
pub struct Selection(Vec<Key>);

impl Selection {
    /// Create a selection, rejecting an empty key list.
    pub fn new<K: Into<Key>>(keys: impl IntoIterator<Item = K>) -> OperatorResult<Self> {
        let keys: Vec<Key> = keys.into_iter().map(Into::into).collect();
        Self::try_from(keys)
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a constructed selection.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<Key>> for Selection {
    type Error = OperatorError;

    fn try_from(keys: Vec<Key>) -> Result<Self, Self::Error> {
        if keys.is_empty() {
            return Err(OperatorError::configuration("selection must not be empty"));
        }
        Ok(Self(keys))
    }
}

impl From<Selection> for Vec<Key> {
    fn from(s: Selection) -> Self {
        s.0
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, k) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}")?;
        }
        f.write_str("]")
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    name: Option<String>,
    value: Value,
}

/// Ordered record of values.
///
/// Names are unique within one tuple.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tuple {
    entries: Vec<Entry>,
}

impl Tuple {
    /// Positional tuple.
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            entries: values
                .into_iter()
                .map(|value| Entry { name: None, value })
                .collect(),
        }
    }

    /// Named tuple, in declared order. A repeated name overwrites the earlier value.
    pub fn named<N, V>(fields: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        let mut out = Self::default();
        for (name, value) in fields {
            out.set_named(name.into(), value.into());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `key`, if the tuple has that field.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.position_of(key).map(|i| &self.entries[i].value)
    }

    /// Write `value` at `key`.
    ///
    /// A missing name appends a new named field, unless the tuple has positional fields:
    /// a tuple is either fully positional or fully named. An out-of-range position is an
    /// error.
    pub fn put(&mut self, key: &Key, value: Value) -> OperatorResult<()> {
        match key {
            Key::Position(i) => match self.entries.get_mut(*i) {
                Some(entry) => {
                    entry.value = value;
                    Ok(())
                }
                None => Err(OperatorError::configuration(format!(
                    "position {i} is out of range for a tuple of {} fields",
                    self.entries.len()
                ))),
            },
            Key::Name(name) if self.is_positional() => {
                Err(OperatorError::configuration(format!(
                    "cannot add field '{name}' to a positional tuple of {} fields",
                    self.entries.len()
                )))
            }
            Key::Name(name) => {
                self.set_named(name.clone(), value);
                Ok(())
            }
        }
    }

    /// Values in declared order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|e| &e.value)
    }

    /// `(name, value)` pairs in declared order; positional entries have no name.
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &Value)> {
        self.entries.iter().map(|e| (e.name.as_deref(), &e.value))
    }

    pub fn into_values(self) -> Vec<Value> {
        self.entries.into_iter().map(|e| e.value).collect()
    }

    fn is_fully_named(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| e.name.is_some())
    }

    fn is_positional(&self) -> bool {
        self.entries.iter().any(|e| e.name.is_none())
    }

    fn position_of(&self, key: &Key) -> Option<usize> {
        match key {
            Key::Position(i) => (*i < self.entries.len()).then_some(*i),
            Key::Name(name) => self
                .entries
                .iter()
                .position(|e| e.name.as_deref() == Some(name.as_str())),
        }
    }

    fn set_named(&mut self, name: String, value: Value) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.name.as_deref() == Some(name.as_str()))
        {
            Some(entry) => entry.value = value,
            None => self.entries.push(Entry {
                name: Some(name),
                value,
            }),
        }
    }
}

/// Fully named tuples encode as JSON objects; anything else encodes positionally.
impl Serialize for Tuple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_fully_named() {
            let mut map = serializer.serialize_map(Some(self.entries.len()))?;
            for e in &self.entries {
                map.serialize_entry(e.name.as_deref().unwrap_or_default(), &e.value)?;
            }
            map.end()
        } else {
            let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
            for e in &self.entries {
                seq.serialize_element(&e.value)?;
            }
            seq.end()
        }
    }
}

struct TupleVisitor;

impl<'de> Visitor<'de> for TupleVisitor {
    type Value = Tuple;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array (positional tuple) or an object (named tuple)")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Tuple, A::Error> {
        let mut values = Vec::new();
        while let Some(v) = seq.next_element::<Value>()? {
            values.push(v);
        }
        Ok(Tuple::new(values))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Tuple, A::Error> {
        let mut out = Tuple::default();
        while let Some((name, value)) = map.next_entry::<String, Value>()? {
            if out.get(&Key::Name(name.clone())).is_some() {
                return Err(de::Error::custom(format!("duplicate tuple field '{name}'")));
            }
            out.set_named(name, value);
        }
        Ok(out)
    }
}

impl<'de> Deserialize<'de> for Tuple {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TupleVisitor)
    }
}

use std::collections::HashMap;
use std::fmt;

use base64::Engine;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::types::ScalarKind;

/// Canonical value representation shared by every source format.
///
/// Strategy by type:
/// - Scalars keep their exact width (`Int` vs `Long`, `Float` vs `Double`) so that
///   schema type checks can tell them apart.
/// - `Map` is a string-keyed mapping (JSON objects, `HashMap` members).
/// - `Record` is a format-native nested record (Avro records, reflected structs).
///   It walks and flattens like a map but never infers as one.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Opaque binary data (Avro bytes/fixed/decimal).
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(Map),
    Record(Map),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Scalar kind of this value, `None` for null, bytes and containers.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Value::Bool(_) => Some(ScalarKind::Boolean),
            Value::Int(_) => Some(ScalarKind::Integer),
            Value::Long(_) => Some(ScalarKind::Long),
            Value::Float(_) => Some(ScalarKind::Float),
            Value::Double(_) => Some(ScalarKind::Double),
            Value::String(_) => Some(ScalarKind::String),
            _ => None,
        }
    }

    /// String-keyed entries of a map or a nested record.
    pub fn as_entries(&self) -> Option<&Map> {
        match self {
            Value::Map(m) | Value::Record(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Cast a scalar to `kind`.
    ///
    /// Numbers convert between each other: fractions truncate toward zero,
    /// wide integers wrap. Booleans and strings only cast to themselves.
    /// Returns `None` when no cast exists.
    pub fn cast(&self, kind: ScalarKind) -> Option<Value> {
        match (self, kind) {
            (Value::Bool(b), ScalarKind::Boolean) => Some(Value::Bool(*b)),
            (Value::String(s), ScalarKind::String) => Some(Value::String(s.clone())),
            (v, ScalarKind::Integer) => v.as_number().map(|n| match n {
                Number::Int(i) => Value::Int(i as i32),
                Number::Float(f) => Value::Int(f as i32),
            }),
            (v, ScalarKind::Long) => v.as_number().map(|n| match n {
                Number::Int(i) => Value::Long(i),
                Number::Float(f) => Value::Long(f as i64),
            }),
            (v, ScalarKind::Float) => v.as_number().map(|n| match n {
                Number::Int(i) => Value::Float(i as f32),
                Number::Float(f) => Value::Float(f as f32),
            }),
            (v, ScalarKind::Double) => v.as_number().map(|n| match n {
                Number::Int(i) => Value::Double(i as f64),
                Number::Float(f) => Value::Double(f),
            }),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(i) => Some(Number::Int(i64::from(*i))),
            Value::Long(l) => Some(Number::Int(*l)),
            Value::Float(f) => Some(Number::Float(f64::from(*f))),
            Value::Double(d) => Some(Number::Float(*d)),
            _ => None,
        }
    }
}

/// Integral numbers stay integral through a cast.
enum Number {
    Int(i64),
    Float(f64),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i32(*i),
            Value::Long(l) => serializer.serialize_i64(*l),
            Value::Float(f) => serializer.serialize_f32(*f),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(b) => {
                serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(b))
            }
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(m) | Value::Record(m) => m.serialize(serializer),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Map
// ════════════════════════════════════════════════════════════════

/// Insertion-ordered string-keyed map.
///
/// Entries live in a vector; `index` maps each key to its position.
#[derive(Clone, Default, PartialEq)]
pub struct Map {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Remove `key`, shifting later entries down to keep their order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.entries.remove(pos);
        for (k, _) in &self.entries[pos..] {
            if let Some(i) = self.index.get_mut(k) {
                *i -= 1;
            }
        }
        Some(value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Serialize for Map {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place() {
        let mut map = Map::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn remove_keeps_order_and_lookups() {
        let mut map: Map = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(map.remove("a"), Some(Value::Int(1)));
        assert_eq!(map.remove("a"), None);
        map.insert("d", 4);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "c", "d"]);
        assert_eq!(map.get("c"), Some(&Value::Int(3)));
        assert_eq!(map.get("d"), Some(&Value::Int(4)));
    }

    #[test]
    fn wide_maps_stay_ordered() {
        let map: Map = (0..50_000).map(|i| (format!("k{i}"), i)).collect();
        assert_eq!(map.len(), 50_000);
        assert_eq!(map.keys().nth(49_999), Some("k49999"));
        assert_eq!(map.get("k25000"), Some(&Value::Int(25_000)));
    }

    #[test]
    fn cast_follows_number_semantics() {
        assert_eq!(Value::Double(5.9).cast(ScalarKind::Integer), Some(Value::Int(5)));
        assert_eq!(Value::Int(7).cast(ScalarKind::Long), Some(Value::Long(7)));
        assert_eq!(Value::Long(3).cast(ScalarKind::Double), Some(Value::Double(3.0)));
        assert_eq!(Value::Double(1.5).cast(ScalarKind::Float), Some(Value::Float(1.5)));
        assert_eq!(Value::from("x").cast(ScalarKind::String), Some(Value::from("x")));
        assert_eq!(Value::from("5").cast(ScalarKind::Integer), None);
        assert_eq!(Value::Bool(true).cast(ScalarKind::String), None);
    }

    #[test]
    fn serializes_as_plain_json() {
        let mut inner = Map::new();
        inner.insert("k", vec![1i64, 2]);
        let mut map = Map::new();
        map.insert("n", Value::Null);
        map.insert("inner", inner);
        map.insert("raw", Value::Bytes(vec![0xff, 0x00]));
        let json = serde_json::to_value(Value::Map(map)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"n": null, "inner": {"k": [1, 2]}, "raw": "/wA="})
        );
    }
}

use std::fmt;

use recast_api::{DataError, Map, Value};
use serde::Deserialize;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};

/// Parse JSON object text into an ordered map.
///
/// Key order follows the text. Every number becomes `Value::Double`.
pub fn parse_object(json: &str) -> Result<Map, DataError> {
    into_object(serde_json::from_str::<JsonValue<false>>(json)?.0)
}

/// Like [`parse_object`], but integers keep an exact type: `Int` when they
/// fit 32 bits, `Long` otherwise. Fractions are `Double`.
pub fn parse_object_exact(json: &str) -> Result<Map, DataError> {
    into_object(serde_json::from_str::<JsonValue<true>>(json)?.0)
}

fn into_object(value: Value) -> Result<Map, DataError> {
    match value {
        Value::Map(map) => Ok(map),
        other => Err(DataError::format(format!(
            "expected a JSON object, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::List(_) => "an array",
        Value::String(_) => "a string",
        _ => "a number",
    }
}

/// `EXACT` selects how integers are read.
struct JsonValue<const EXACT: bool>(Value);

impl<'de, const EXACT: bool> Deserialize<'de> for JsonValue<EXACT> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(JsonVisitor::<EXACT>).map(JsonValue)
    }
}

struct JsonVisitor<const EXACT: bool>;

impl<'de, const EXACT: bool> Visitor<'de> for JsonVisitor<EXACT> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        if !EXACT {
            return Ok(Value::Double(v as f64));
        }
        Ok(i32::try_from(v).map_or(Value::Long(v), Value::Int))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        match i64::try_from(v) {
            Ok(v) => self.visit_i64(v),
            Err(_) => Ok(Value::Double(v as f64)),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Double(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(JsonValue::<EXACT>(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = Map::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, JsonValue(value))) = access.next_entry::<String, JsonValue<EXACT>>()? {
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_key_order_and_doubles() {
        let map = parse_object(r#"{"z": 1, "a": [true, null, {"k": "v"}]}"#).unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(map.get("z"), Some(&Value::Double(1.0)));
        let mut inner = Map::new();
        inner.insert("k", "v");
        assert_eq!(
            map.get("a"),
            Some(&Value::List(vec![Value::Bool(true), Value::Null, Value::Map(inner)]))
        );
    }

    #[test]
    fn exact_mode_keeps_integer_widths() {
        let map = parse_object_exact(r#"{"i": 5, "l": 5000000000, "d": 1.5, "n": [-1]}"#).unwrap();
        assert_eq!(map.get("i"), Some(&Value::Int(5)));
        assert_eq!(map.get("l"), Some(&Value::Long(5_000_000_000)));
        assert_eq!(map.get("d"), Some(&Value::Double(1.5)));
        assert_eq!(map.get("n"), Some(&Value::List(vec![Value::Int(-1)])));
    }

    #[test]
    fn rejects_non_objects() {
        let err = parse_object("\"text\"").unwrap_err();
        assert_eq!(err.message, "expected a JSON object, found a string");
    }
}

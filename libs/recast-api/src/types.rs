use serde::{Deserialize, Serialize};

use crate::value::Value;

// ════════════════════════════════════════════════════════════════
//  Scalar Kind
// ════════════════════════════════════════════════════════════════

/// The six scalar kinds a record field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScalarKind {
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    String,
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarKind::Boolean => write!(f, "BOOLEAN"),
            ScalarKind::Integer => write!(f, "INTEGER"),
            ScalarKind::Long => write!(f, "LONG"),
            ScalarKind::Float => write!(f, "FLOAT"),
            ScalarKind::Double => write!(f, "DOUBLE"),
            ScalarKind::String => write!(f, "STRING"),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Type
// ════════════════════════════════════════════════════════════════

/// Value-level type tag carried by a [`TypedValue`].
///
/// The `Unknown*` variants come out of inference when a container is empty
/// (or its first element is), so its element kind cannot be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Scalar(ScalarKind),
    List(ScalarKind),
    ListOfMap(ScalarKind),
    Map(ScalarKind),
    MapOfMap(ScalarKind),
    UnknownList,
    UnknownListOfMap,
    UnknownMap,
    UnknownMapOfMap,
    Unknown,
}

impl Type {
    /// Infer the type of `value` from its runtime shape.
    ///
    /// Containers are typed by their first element only, mirroring how
    /// record stores tag values.
    pub fn infer(value: &Value) -> Type {
        if let Some(kind) = value.scalar_kind() {
            return Type::Scalar(kind);
        }
        match value {
            Value::List(items) => match items.first() {
                None => Type::UnknownList,
                Some(Value::Map(inner)) => match inner.values().next() {
                    None => Type::UnknownListOfMap,
                    Some(v) => v.scalar_kind().map_or(Type::Unknown, Type::ListOfMap),
                },
                Some(first) => first.scalar_kind().map_or(Type::Unknown, Type::List),
            },
            Value::Map(map) => match map.values().next() {
                None => Type::UnknownMap,
                Some(Value::Map(inner)) => match inner.values().next() {
                    None => Type::UnknownMapOfMap,
                    Some(v) => v.scalar_kind().map_or(Type::Unknown, Type::MapOfMap),
                },
                Some(first) => first.scalar_kind().map_or(Type::Unknown, Type::Map),
            },
            _ => Type::Unknown,
        }
    }

    pub fn is_unknown_container(&self) -> bool {
        matches!(
            self,
            Type::UnknownList | Type::UnknownListOfMap | Type::UnknownMap | Type::UnknownMapOfMap
        )
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Scalar(k) => write!(f, "{k}"),
            Type::List(k) => write!(f, "LIST<{k}>"),
            Type::ListOfMap(k) => write!(f, "LIST<MAP<{k}>>"),
            Type::Map(k) => write!(f, "MAP<{k}>"),
            Type::MapOfMap(k) => write!(f, "MAP<MAP<{k}>>"),
            Type::UnknownList => write!(f, "UNKNOWN_LIST"),
            Type::UnknownListOfMap => write!(f, "UNKNOWN_LIST_OF_MAP"),
            Type::UnknownMap => write!(f, "UNKNOWN_MAP"),
            Type::UnknownMapOfMap => write!(f, "UNKNOWN_MAP_OF_MAP"),
            Type::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  TypedValue
// ════════════════════════════════════════════════════════════════

/// A value paired with either an asserted or an inferred [`Type`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypedValue {
    pub ty: Type,
    pub value: Value,
}

impl TypedValue {
    /// Tag `value` with the type inferred from its shape.
    pub fn infer(value: Value) -> Self {
        Self {
            ty: Type::infer(&value),
            value,
        }
    }

    /// Tag `value` with an asserted type. No check is made.
    pub fn with_type(ty: Type, value: Value) -> Self {
        Self { ty, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Map;

    fn map_of(entries: Vec<(&str, Value)>) -> Value {
        Value::Map(entries.into_iter().collect())
    }

    #[test]
    fn infers_scalars() {
        assert_eq!(Type::infer(&Value::Bool(true)), Type::Scalar(ScalarKind::Boolean));
        assert_eq!(Type::infer(&Value::Int(1)), Type::Scalar(ScalarKind::Integer));
        assert_eq!(Type::infer(&Value::Long(1)), Type::Scalar(ScalarKind::Long));
        assert_eq!(Type::infer(&Value::Float(1.0)), Type::Scalar(ScalarKind::Float));
        assert_eq!(Type::infer(&Value::Double(1.0)), Type::Scalar(ScalarKind::Double));
        assert_eq!(Type::infer(&Value::from("s")), Type::Scalar(ScalarKind::String));
        assert_eq!(Type::infer(&Value::Null), Type::Unknown);
        assert_eq!(Type::infer(&Value::Bytes(vec![1])), Type::Unknown);
    }

    #[test]
    fn infers_containers_from_first_element() {
        assert_eq!(
            Type::infer(&Value::from(vec!["a", "b"])),
            Type::List(ScalarKind::String)
        );
        assert_eq!(Type::infer(&Value::List(vec![])), Type::UnknownList);
        assert_eq!(
            Type::infer(&Value::List(vec![map_of(vec![("a", Value::Long(1))])])),
            Type::ListOfMap(ScalarKind::Long)
        );
        assert_eq!(
            Type::infer(&Value::List(vec![Value::Map(Map::new())])),
            Type::UnknownListOfMap
        );
        assert_eq!(
            Type::infer(&map_of(vec![("a", Value::Double(1.0))])),
            Type::Map(ScalarKind::Double)
        );
        assert_eq!(Type::infer(&Value::Map(Map::new())), Type::UnknownMap);
        assert_eq!(
            Type::infer(&map_of(vec![("a", map_of(vec![("b", Value::Bool(false))]))])),
            Type::MapOfMap(ScalarKind::Boolean)
        );
        assert_eq!(
            Type::infer(&map_of(vec![("a", Value::Map(Map::new()))])),
            Type::UnknownMapOfMap
        );
    }

    #[test]
    fn nested_lists_and_records_are_unknown() {
        assert_eq!(
            Type::infer(&Value::List(vec![Value::List(vec![Value::Int(1)])])),
            Type::Unknown
        );
        assert_eq!(Type::infer(&Value::Record(Map::new())), Type::Unknown);
    }
}

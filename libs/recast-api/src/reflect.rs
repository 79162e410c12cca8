//! Static member descriptions for reflective conversion.
//!
//! A type exposes its readable members through [`Reflect`], usually via
//! `#[derive(Reflect)]`. Each [`Member`] carries the declared [`Shape`] of the
//! member and an accessor that reads it as a [`Value`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::types::ScalarKind;
use crate::value::{Map, Value};

/// Declared type of a member, as written in the source type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Scalar(ScalarKind),
    List(Box<Shape>),
    Map { key: Box<Shape>, value: Box<Shape> },
    /// A nested reflected type.
    Object(&'static str),
    /// Anything the converter does not read (unsigned integers, chars, ...).
    Other(&'static str),
}

impl Shape {
    pub fn list(inner: Shape) -> Shape {
        Shape::List(Box::new(inner))
    }

    pub fn map(key: Shape, value: Shape) -> Shape {
        Shape::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn is_string_keyed_map(&self) -> bool {
        matches!(self, Shape::Map { key, .. } if **key == Shape::Scalar(ScalarKind::String))
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Scalar(k) => write!(f, "{k}"),
            Shape::List(inner) => write!(f, "List<{inner}>"),
            Shape::Map { key, value } => write!(f, "Map<{key}, {value}>"),
            Shape::Object(name) | Shape::Other(name) => f.write_str(name),
        }
    }
}

/// Types that can report their declared [`Shape`].
pub trait Describe {
    fn shape() -> Shape;
}

/// Types that can be read into a [`Value`].
pub trait IntoValue {
    fn to_value(&self) -> Value;
}

// ════════════════════════════════════════════════════════════════
//  Scalars
// ════════════════════════════════════════════════════════════════

macro_rules! scalar {
    ($ty:ty, $kind:ident, $variant:ident) => {
        impl Describe for $ty {
            fn shape() -> Shape {
                Shape::Scalar(ScalarKind::$kind)
            }
        }

        impl IntoValue for $ty {
            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        }
    };
}

scalar!(bool, Boolean, Bool);
scalar!(i32, Integer, Int);
scalar!(i64, Long, Long);
scalar!(f32, Float, Float);
scalar!(f64, Double, Double);
scalar!(String, String, String);

macro_rules! other {
    ($($ty:ty => $conv:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn shape() -> Shape {
                    Shape::Other(stringify!($ty))
                }
            }

            impl IntoValue for $ty {
                fn to_value(&self) -> Value {
                    let conv: fn(&$ty) -> Value = $conv;
                    conv(self)
                }
            }
        )*
    };
}

other! {
    i8 => |v| Value::Int(i32::from(*v)),
    i16 => |v| Value::Int(i32::from(*v)),
    u8 => |v| Value::Int(i32::from(*v)),
    u16 => |v| Value::Int(i32::from(*v)),
    u32 => |v| Value::Long(i64::from(*v)),
    u64 => |v| i64::try_from(*v).map_or(Value::Double(*v as f64), Value::Long),
    usize => |v| i64::try_from(*v).map_or(Value::Double(*v as f64), Value::Long),
    char => |v| Value::String(v.to_string()),
}

// ════════════════════════════════════════════════════════════════
//  Containers
// ════════════════════════════════════════════════════════════════

impl<T: Describe> Describe for Option<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, IntoValue::to_value)
    }
}

impl<T: Describe> Describe for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }
}

impl<T: IntoValue> IntoValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn shape() -> Shape {
        Shape::list(T::shape())
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(IntoValue::to_value).collect())
    }
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }
}

/// Keys are sorted so the same map always yields the same field order.
impl<K: ToString, V: IntoValue, S> IntoValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        let mut pairs: Vec<_> = self.iter().map(|(k, v)| (k.to_string(), v)).collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Value::Map(pairs.into_iter().map(|(k, v)| (k, v.to_value())).collect())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::map(K::shape(), V::shape())
    }
}

impl<K: ToString, V: IntoValue> IntoValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_string(), v.to_value())).collect())
    }
}

impl IntoValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl IntoValue for Map {
    fn to_value(&self) -> Value {
        Value::Map(self.clone())
    }
}

// ════════════════════════════════════════════════════════════════
//  Members
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// A stored field.
    Field,
    /// A zero-argument method returning an owned value.
    Getter,
}

type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// One readable member of `T`.
pub struct Member<T: ?Sized> {
    pub name: &'static str,
    pub kind: MemberKind,
    pub shape: Shape,
    get: Accessor<T>,
}

impl<T: ?Sized> Member<T> {
    pub fn new(
        name: &'static str,
        kind: MemberKind,
        shape: Shape,
        get: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            kind,
            shape,
            get: Arc::new(get),
        }
    }

    /// Read this member from `target`.
    pub fn read(&self, target: &T) -> Value {
        (self.get)(target)
    }
}

impl<T: ?Sized> Clone for Member<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            kind: self.kind,
            shape: self.shape.clone(),
            get: Arc::clone(&self.get),
        }
    }
}

impl<T: ?Sized> std::fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("shape", &self.shape)
            .finish()
    }
}

/// Declared shape of whatever `getter` returns.
pub fn returned_shape<T: ?Sized, R: Describe>(_getter: impl Fn(&T) -> R) -> Shape {
    R::shape()
}

/// Types whose members can be read by name.
pub trait Reflect: Sized {
    /// Type name used in diagnostics.
    fn type_name() -> &'static str;

    /// Every member the type exposes, fields first then getters.
    fn members() -> Vec<Member<Self>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_maps_convert_with_sorted_keys() {
        let map: HashMap<String, i32> = [("b", 2), ("c", 3), ("a", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let value = map.to_value();
        let entries = value.as_entries().unwrap();
        assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(entries.get("b"), Some(&Value::Int(2)));
    }

    #[test]
    fn container_shapes() {
        assert_eq!(
            <HashMap<String, Vec<i64>>>::shape(),
            Shape::map(
                Shape::Scalar(ScalarKind::String),
                Shape::list(Shape::Scalar(ScalarKind::Long))
            )
        );
        assert_eq!(<Option<f32>>::shape(), Shape::Scalar(ScalarKind::Float));
        assert_eq!(<u64>::shape(), Shape::Other("u64"));
        assert!(<BTreeMap<String, bool>>::shape().is_string_keyed_map());
        assert!(!<BTreeMap<i32, bool>>::shape().is_string_keyed_map());
    }

    #[test]
    fn reads_optional_and_nested_values() {
        assert_eq!(None::<i32>.to_value(), Value::Null);
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), vec![1i32, 2]);
        assert_eq!(
            map.to_value(),
            Value::Map([("k", vec![1i32, 2])].into_iter().collect())
        );
    }

    #[test]
    fn getter_shape_follows_return_type() {
        struct Probe;
        impl Probe {
            fn tags(&self) -> Vec<String> {
                Vec::new()
            }
        }
        assert_eq!(
            returned_shape::<Probe, _>(Probe::tags),
            Shape::list(Shape::Scalar(ScalarKind::String))
        );
    }
}

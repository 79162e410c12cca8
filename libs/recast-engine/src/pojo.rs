//! Reflected Rust values as a conversion source.
//!
//! Accessors are resolved once, when the converter is built. With a schema,
//! every first path token must resolve to a getter or a field whose declared
//! shape matches the field declaration. Without one, every stored field on
//! the whitelist of supported shapes is flattened and the rest are excluded.

use std::borrow::Cow;
use std::collections::HashMap;

use recast_api::reflect::{Member, MemberKind, Reflect, Shape};
use recast_api::{DataError, Record, ScalarKind, Value};

use crate::converter::{RecordConverter, SourceFormat};
use crate::error::ConvertError;
use crate::schema::{FieldSpec, FieldType, Schema};

pub type PojoConverter<T> = RecordConverter<PojoFormat<T>>;

// ════════════════════════════════════════════════════════════════
//  AccessorResolver
// ════════════════════════════════════════════════════════════════

/// Outcome of checking one member in discovery mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Included,
    Excluded { reason: String },
}

/// Resolves named accessors of `T` against field declarations.
pub struct AccessorResolver<T> {
    type_name: &'static str,
    members: Vec<Member<T>>,
}

impl<T: Reflect> AccessorResolver<T> {
    pub fn new() -> Self {
        Self {
            type_name: T::type_name(),
            members: T::members(),
        }
    }
}

impl<T: Reflect> Default for AccessorResolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AccessorResolver<T> {
    fn find(&self, name: &str, kind: MemberKind) -> Option<&Member<T>> {
        self.members.iter().find(|m| m.name == name && m.kind == kind)
    }

    /// Resolve the accessor for `field`'s first token.
    ///
    /// A getter wins over a field of the same name. A single-token path must
    /// match the declared type exactly; a longer path needs a string-keyed map
    /// to walk into.
    pub fn resolve(&self, field: &FieldSpec) -> Result<Member<T>, ConvertError> {
        let tokens = field.tokens();
        let Some(root) = tokens.first() else {
            return Err(ConvertError::Accessor(format!("field {field} has an empty reference")));
        };
        let member = self
            .find(root, MemberKind::Getter)
            .or_else(|| self.find(root, MemberKind::Field))
            .ok_or_else(|| {
                ConvertError::Accessor(format!(
                    "{} has no getter or field named '{root}' (field {field})",
                    self.type_name
                ))
            })?;

        let matches = if tokens.len() > 1 {
            member.shape.is_string_keyed_map()
        } else {
            shape_matches(field.field_type(), field.subtype(), &member.shape)
        };
        if !matches {
            return Err(ConvertError::Accessor(format!(
                "{}.{} is declared as {}, which does not match field {field}",
                self.type_name, member.name, member.shape
            )));
        }
        Ok(member.clone())
    }

    /// Classify every stored field for schema-less flattening.
    pub fn discover(&self) -> Vec<(Member<T>, Classification)> {
        self.members
            .iter()
            .filter(|m| m.kind == MemberKind::Field)
            .map(|m| {
                let class = if is_flattenable(&m.shape) {
                    Classification::Included
                } else {
                    Classification::Excluded {
                        reason: format!("unsupported type {}", m.shape),
                    }
                };
                (m.clone(), class)
            })
            .collect()
    }
}

/// Structural match of a declared shape against (type, subtype).
pub fn shape_matches(field_type: FieldType, subtype: Option<ScalarKind>, shape: &Shape) -> bool {
    if let Some(kind) = field_type.as_scalar() {
        return *shape == Shape::Scalar(kind);
    }
    if field_type == FieldType::Record {
        return shape.is_string_keyed_map();
    }
    let Some(sub) = subtype else {
        return false;
    };
    let scalar = || Shape::Scalar(sub);
    let string_map = |value: Shape| Shape::map(Shape::Scalar(ScalarKind::String), value);
    let expected = match field_type {
        FieldType::List => Shape::list(scalar()),
        FieldType::ListOfMap => Shape::list(string_map(scalar())),
        FieldType::Map => string_map(scalar()),
        FieldType::MapOfMap => string_map(string_map(scalar())),
        _ => return false,
    };
    *shape == expected
}

/// Shapes flattened in discovery mode: scalars, and lists or string-keyed
/// maps of scalars or of string-keyed maps of scalars.
fn is_flattenable(shape: &Shape) -> bool {
    fn is_scalar(shape: &Shape) -> bool {
        matches!(shape, Shape::Scalar(_))
    }
    fn is_inner(shape: &Shape) -> bool {
        match shape {
            Shape::Map { value, .. } => shape.is_string_keyed_map() && is_scalar(value),
            other => is_scalar(other),
        }
    }
    match shape {
        Shape::Scalar(_) => true,
        Shape::List(inner) => is_inner(inner),
        Shape::Map { value, .. } => shape.is_string_keyed_map() && is_inner(value),
        _ => false,
    }
}

// ════════════════════════════════════════════════════════════════
//  PojoFormat
// ════════════════════════════════════════════════════════════════

/// Source is any `T: Reflect`.
pub struct PojoFormat<T> {
    resolver: AccessorResolver<T>,
    accessors: Vec<Member<T>>,
    index: HashMap<String, usize>,
}

impl<T: Reflect> PojoFormat<T> {
    pub fn new() -> Self {
        Self {
            resolver: AccessorResolver::new(),
            accessors: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Reflect> Default for PojoFormat<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PojoFormat<T> {
    /// Names of the accessors resolved at build time, in resolution order.
    pub fn accessor_names(&self) -> Vec<&'static str> {
        self.accessors.iter().map(|m| m.name).collect()
    }

    fn push(&mut self, member: Member<T>) {
        if !self.index.contains_key(member.name) {
            self.index.insert(member.name.to_string(), self.accessors.len());
            self.accessors.push(member);
        }
    }
}

impl<T> SourceFormat for PojoFormat<T> {
    type Source = T;

    fn name(&self) -> &'static str {
        "pojo"
    }

    fn root_get<'a>(&self, source: &'a T, key: &str) -> Result<Option<Cow<'a, Value>>, DataError> {
        Ok(self
            .index
            .get(key)
            .and_then(|&i| self.accessors.get(i))
            .map(|accessor| Cow::Owned(accessor.read(source))))
    }

    fn flatten(&self, source: &T, record: &mut dyn Record) -> Result<(), DataError> {
        for accessor in &self.accessors {
            let value = accessor.read(source);
            if !value.is_null() {
                record.force_set(accessor.name, value);
            }
        }
        Ok(())
    }

    fn bind(&mut self, schema: Option<&Schema>) -> Result<(), ConvertError> {
        self.accessors.clear();
        self.index.clear();
        match schema {
            Some(schema) => {
                for field in schema.fields() {
                    let member = self.resolver.resolve(field)?;
                    self.push(member);
                }
            }
            None => {
                for (member, class) in self.resolver.discover() {
                    match class {
                        Classification::Included => self.push(member),
                        Classification::Excluded { reason } => tracing::warn!(
                            type_name = self.resolver.type_name,
                            member = member.name,
                            %reason,
                            "member excluded from conversion"
                        ),
                    }
                }
            }
        }
        tracing::debug!(
            type_name = self.resolver.type_name,
            accessors = self.accessors.len(),
            "resolved accessors"
        );
        Ok(())
    }
}

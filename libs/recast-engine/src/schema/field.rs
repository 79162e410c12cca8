use std::fmt;
use std::sync::OnceLock;

use recast_api::{ScalarKind, Type};
use serde::{Deserialize, Serialize};

use super::SchemaError;

/// Path delimiter inside a reference.
pub const DELIMITER: char = '.';

// ════════════════════════════════════════════════════════════════
//  FieldType
// ════════════════════════════════════════════════════════════════

/// Declared type of a field: a scalar, a container of scalars, or `RECORD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    String,
    List,
    #[serde(alias = "LISTOFMAP")]
    ListOfMap,
    Map,
    #[serde(alias = "MAPOFMAP")]
    MapOfMap,
    /// Flatten the referenced value into the output record.
    Record,
}

impl FieldType {
    pub fn as_scalar(&self) -> Option<ScalarKind> {
        match self {
            FieldType::Boolean => Some(ScalarKind::Boolean),
            FieldType::Integer => Some(ScalarKind::Integer),
            FieldType::Long => Some(ScalarKind::Long),
            FieldType::Float => Some(ScalarKind::Float),
            FieldType::Double => Some(ScalarKind::Double),
            FieldType::String => Some(ScalarKind::String),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            FieldType::List | FieldType::ListOfMap | FieldType::Map | FieldType::MapOfMap
        )
    }
}

impl From<ScalarKind> for FieldType {
    fn from(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Boolean => FieldType::Boolean,
            ScalarKind::Integer => FieldType::Integer,
            ScalarKind::Long => FieldType::Long,
            ScalarKind::Float => FieldType::Float,
            ScalarKind::Double => FieldType::Double,
            ScalarKind::String => FieldType::String,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = self.as_scalar() {
            return write!(f, "{kind}");
        }
        match self {
            FieldType::List => f.write_str("LIST"),
            FieldType::ListOfMap => f.write_str("LIST_OF_MAP"),
            FieldType::Map => f.write_str("MAP"),
            FieldType::MapOfMap => f.write_str("MAP_OF_MAP"),
            _ => f.write_str("RECORD"),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  FieldDecl
// ════════════════════════════════════════════════════════════════

/// One field as written in a schema document, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<FieldType>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: Some(name.into()),
            field_type: Some(field_type),
            ..Self::default()
        }
    }

    /// A `RECORD` field flattening whatever `reference` points at.
    pub fn record(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            field_type: Some(FieldType::Record),
            ..Self::default()
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_subtype(mut self, subtype: ScalarKind) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    /// Check the field invariants, collecting every violation.
    pub fn validate(&self) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        let name = self.name.as_deref().filter(|n| !n.is_empty());
        let is_record = self.field_type == Some(FieldType::Record);

        if name.is_none() && !is_record {
            errors.push(SchemaError::FieldRequiresName);
        }
        if name.is_some_and(|n| n.contains(DELIMITER)) {
            errors.push(SchemaError::FieldNameDisallowsDelimiters);
        }
        if self
            .reference
            .as_deref()
            .is_some_and(|r| r.starts_with(DELIMITER) || r.ends_with(DELIMITER))
        {
            errors.push(SchemaError::FieldReferenceDisallowsTrailingDelimiters);
        }

        let Some(field_type) = self.field_type else {
            errors.push(SchemaError::FieldRequiresType);
            return errors;
        };

        if is_record {
            if self.name.is_some() {
                errors.push(SchemaError::RecordRequiresNullName);
            }
            if self.reference.as_deref().is_none_or(str::is_empty) {
                errors.push(SchemaError::RecordRequiresReference);
            }
            if self.subtype.is_some() {
                errors.push(SchemaError::RecordRequiresNullSubtype);
            }
        } else if field_type.as_scalar().is_some() {
            if self.subtype.is_some() {
                errors.push(SchemaError::ScalarRequiresNullSubtype);
            }
        } else if self.subtype.and_then(|s| s.as_scalar()).is_none() {
            errors.push(SchemaError::ContainerRequiresScalarSubtype);
        }

        errors
    }

    /// Convert into a [`FieldSpec`], defaulting the reference to the name.
    pub fn into_spec(self) -> Result<FieldSpec, Vec<SchemaError>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        let FieldDecl { name, reference, field_type, subtype } = self;
        let field_type = field_type.ok_or_else(|| vec![SchemaError::FieldRequiresType])?;
        let reference = match reference.filter(|r| !r.is_empty()) {
            Some(r) => r,
            None => name.clone().ok_or_else(|| vec![SchemaError::FieldRequiresName])?,
        };
        Ok(FieldSpec {
            name,
            reference,
            field_type,
            subtype: subtype.and_then(|s| s.as_scalar()),
            tokens: OnceLock::new(),
        })
    }
}

// ════════════════════════════════════════════════════════════════
//  FieldSpec
// ════════════════════════════════════════════════════════════════

/// A validated field. Immutable once built.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: Option<String>,
    reference: String,
    field_type: FieldType,
    subtype: Option<ScalarKind>,
    tokens: OnceLock<Vec<String>>,
}

impl FieldSpec {
    /// Output key. `None` only for `RECORD` fields.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn subtype(&self) -> Option<ScalarKind> {
        self.subtype
    }

    /// Reference split on the delimiter, computed on first use.
    pub fn tokens(&self) -> &[String] {
        self.tokens
            .get_or_init(|| self.reference.split(DELIMITER).map(String::from).collect())
    }

    /// Value-level type a conforming value carries. `None` for `RECORD`.
    pub fn expected_type(&self) -> Option<Type> {
        if let Some(kind) = self.field_type.as_scalar() {
            return Some(Type::Scalar(kind));
        }
        let sub = self.subtype?;
        match self.field_type {
            FieldType::List => Some(Type::List(sub)),
            FieldType::ListOfMap => Some(Type::ListOfMap(sub)),
            FieldType::Map => Some(Type::Map(sub)),
            FieldType::MapOfMap => Some(Type::MapOfMap(sub)),
            _ => None,
        }
    }
}

impl PartialEq for FieldSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.reference == other.reference
            && self.field_type == other.field_type
            && self.subtype == other.subtype
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{name: {}, reference: {}, type: {}, subtype: {}}}",
            self.name.as_deref().unwrap_or("null"),
            self.reference,
            self.field_type,
            self.subtype.map_or_else(|| "null".to_string(), |s| s.to_string()),
        )
    }
}

//! Declarative field schemas: parsing, validation and lookup.

mod field;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

pub use field::{DELIMITER, FieldDecl, FieldSpec, FieldType};

use crate::error::ConvertError;

// ════════════════════════════════════════════════════════════════
//  SchemaError
// ════════════════════════════════════════════════════════════════

/// A single schema validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaError {
    FieldRequiresName,
    FieldRequiresType,
    FieldNameDisallowsDelimiters,
    FieldReferenceDisallowsTrailingDelimiters,
    RecordRequiresNullName,
    RecordRequiresReference,
    RecordRequiresNullSubtype,
    ScalarRequiresNullSubtype,
    ContainerRequiresScalarSubtype,
    SchemaRequiresFields,
    SchemaRequiresUniqueFieldNames,
}

impl SchemaError {
    pub fn message(&self) -> &'static str {
        match self {
            SchemaError::FieldRequiresName => "field requires a name",
            SchemaError::FieldRequiresType => "field requires a type",
            SchemaError::FieldNameDisallowsDelimiters => "field name contains a delimiter",
            SchemaError::FieldReferenceDisallowsTrailingDelimiters => {
                "field reference starts or ends with a delimiter"
            }
            SchemaError::RecordRequiresNullName => "RECORD field must not have a name",
            SchemaError::RecordRequiresReference => "RECORD field requires a reference",
            SchemaError::RecordRequiresNullSubtype => "RECORD field must not have a subtype",
            SchemaError::ScalarRequiresNullSubtype => "scalar field must not have a subtype",
            SchemaError::ContainerRequiresScalarSubtype => {
                "LIST, LIST_OF_MAP, MAP and MAP_OF_MAP fields require a scalar subtype"
            }
            SchemaError::SchemaRequiresFields => "schema has no fields",
            SchemaError::SchemaRequiresUniqueFieldNames => "schema field names are not unique",
        }
    }

    pub fn resolution(&self) -> &'static str {
        match self {
            SchemaError::FieldRequiresName => "set `name` on every non-RECORD field",
            SchemaError::FieldRequiresType => "set `type` on every field",
            SchemaError::FieldNameDisallowsDelimiters => {
                "remove `.` from `name`; nested paths belong in `reference`"
            }
            SchemaError::FieldReferenceDisallowsTrailingDelimiters => {
                "remove the leading or trailing `.` from `reference`"
            }
            SchemaError::RecordRequiresNullName => "remove `name`; RECORD fields flatten in place",
            SchemaError::RecordRequiresReference => "set `reference` to the value to flatten",
            SchemaError::RecordRequiresNullSubtype => "remove `subtype` from the RECORD field",
            SchemaError::ScalarRequiresNullSubtype => "remove `subtype` from the scalar field",
            SchemaError::ContainerRequiresScalarSubtype => {
                "set `subtype` to one of BOOLEAN, INTEGER, LONG, FLOAT, DOUBLE, STRING"
            }
            SchemaError::SchemaRequiresFields => "declare at least one field",
            SchemaError::SchemaRequiresUniqueFieldNames => "rename the duplicated fields",
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.resolution())
    }
}

// ════════════════════════════════════════════════════════════════
//  Schema
// ════════════════════════════════════════════════════════════════

/// An ordered, validated, non-empty list of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Validate `decls` and build a schema.
    ///
    /// Every violation (schema-level first, then per field in order) is
    /// collected before returning.
    pub fn new(decls: Vec<FieldDecl>) -> Result<Self, Vec<SchemaError>> {
        let mut errors = Vec::new();

        if decls.is_empty() {
            errors.push(SchemaError::SchemaRequiresFields);
        }
        let mut seen = HashSet::new();
        let duplicated = decls
            .iter()
            .filter(|d| d.field_type != Some(FieldType::Record))
            .filter_map(|d| d.name.as_deref())
            .any(|name| !seen.insert(name));
        if duplicated {
            errors.push(SchemaError::SchemaRequiresUniqueFieldNames);
        }
        for decl in &decls {
            errors.extend(decl.validate());
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let fields = decls
            .into_iter()
            .map(FieldDecl::into_spec)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    /// Parse a JSON schema document.
    ///
    /// Accepts either `{"fields": [...]}` or a bare array of fields.
    pub fn from_json(text: &str) -> Result<Self, ConvertError> {
        let doc: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ConvertError::SchemaFile(format!("invalid JSON: {e}")))?;
        let fields = match doc {
            serde_json::Value::Array(_) => doc,
            serde_json::Value::Object(mut obj) => obj.remove("fields").ok_or_else(|| {
                ConvertError::SchemaFile("schema document has no `fields` key".to_string())
            })?,
            other => {
                return Err(ConvertError::SchemaFile(format!(
                    "expected an object or an array, found {other}"
                )));
            }
        };
        let decls: Vec<FieldDecl> = serde_json::from_value(fields)
            .map_err(|e| ConvertError::SchemaFile(format!("invalid field: {e}")))?;
        Schema::new(decls).map_err(ConvertError::InvalidSchema)
    }

    /// Load a schema by name.
    ///
    /// The name is resolved against each of `resource_dirs` in order, then as
    /// a plain filesystem path.
    pub fn load(name: &str, resource_dirs: &[PathBuf]) -> Result<Self, ConvertError> {
        let path = resolve(name, resource_dirs).ok_or_else(|| {
            ConvertError::SchemaFile(format!(
                "schema '{name}' not found in {resource_dirs:?} or on the filesystem"
            ))
        })?;
        tracing::debug!(schema = %name, path = %path.display(), "resolved schema");
        let text = std::fs::read_to_string(&path)
            .map_err(|e| ConvertError::SchemaFile(format!("{}: {e}", path.display())))?;
        Self::from_json(&text).map_err(|e| e.with_context(path.display()))
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false`: a schema has at least one field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name() == Some(name))
    }
}

fn resolve(name: &str, resource_dirs: &[PathBuf]) -> Option<PathBuf> {
    let relative = name.trim_start_matches('/');
    resource_dirs
        .iter()
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.is_file())
        .or_else(|| Some(Path::new(name).to_path_buf()).filter(|p| p.is_file()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_api::ScalarKind;

    #[test]
    fn rejects_empty_schema() {
        assert_eq!(Schema::new(vec![]), Err(vec![SchemaError::SchemaRequiresFields]));
    }

    #[test]
    fn record_fields_skip_uniqueness() {
        let schema = Schema::new(vec![
            FieldDecl::record("a"),
            FieldDecl::record("b"),
            FieldDecl::new("x", FieldType::Integer),
        ]);
        assert!(schema.is_ok());

        let dup = Schema::new(vec![
            FieldDecl::new("x", FieldType::Integer),
            FieldDecl::new("x", FieldType::Long).with_reference("y"),
        ]);
        assert_eq!(dup, Err(vec![SchemaError::SchemaRequiresUniqueFieldNames]));
    }

    #[test]
    fn collects_schema_and_field_errors_together() {
        let errors = Schema::new(vec![
            FieldDecl::new("x", FieldType::List),
            FieldDecl::new("x", FieldType::String).with_reference("x."),
        ])
        .unwrap_err();
        assert_eq!(
            errors,
            vec![
                SchemaError::SchemaRequiresUniqueFieldNames,
                SchemaError::ContainerRequiresScalarSubtype,
                SchemaError::FieldReferenceDisallowsTrailingDelimiters,
            ]
        );
    }

    #[test]
    fn parses_wrapped_and_bare_documents() {
        let wrapped = Schema::from_json(
            r#"{"fields": [
                {"name": "id", "type": "LONG"},
                {"name": "tags", "reference": "meta.tags", "type": "LIST", "subtype": "STRING"},
                {"reference": "payload", "type": "RECORD"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(wrapped.len(), 3);
        assert_eq!(wrapped.field("tags").unwrap().subtype(), Some(ScalarKind::String));

        let bare = Schema::from_json(
            r#"[{"name": "m", "type": "MAPOFMAP", "subtype": "DOUBLE"}]"#,
        )
        .unwrap();
        assert_eq!(bare.fields()[0].field_type(), FieldType::MapOfMap);
    }

    #[test]
    fn invalid_documents_are_schema_file_errors() {
        assert!(matches!(
            Schema::from_json(r#"{"name": "x"}"#),
            Err(ConvertError::SchemaFile(_))
        ));
        assert!(matches!(
            Schema::from_json(r#"[{"name": "x", "type": "DATE"}]"#),
            Err(ConvertError::SchemaFile(_))
        ));
        assert!(matches!(
            Schema::from_json(r#"{"fields": []}"#),
            Err(ConvertError::InvalidSchema(errors)) if errors == vec![SchemaError::SchemaRequiresFields]
        ));
    }
}

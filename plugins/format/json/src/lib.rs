//! JSON text as a conversion source.
//!
//! Text is parsed into an ordered map and converted like any map source.
//! Every JSON number parses as DOUBLE; with a schema, numbers declared
//! INTEGER, LONG or FLOAT are narrowed before assignment. Without a schema
//! nothing is narrowed.

mod parse;

use std::borrow::Cow;

use recast_api::{DataError, Map, Record, ScalarKind, Value};
use recast_engine::converter::{RecordConverter, SourceFormat};
use recast_engine::map::MapFormat;
use recast_engine::schema::{FieldSpec, FieldType, Schema};
use recast_engine::{ConvertError, ConverterConfig};

pub use parse::{parse_object, parse_object_exact};

// ════════════════════════════════════════════════════════════════
//  JsonFormat
// ════════════════════════════════════════════════════════════════

/// Map format with numeric narrowing of extracted values.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl SourceFormat for JsonFormat {
    type Source = Map;

    fn name(&self) -> &'static str {
        "json"
    }

    fn root_get<'a>(&self, source: &'a Map, key: &str) -> Result<Option<Cow<'a, Value>>, DataError> {
        MapFormat.root_get(source, key)
    }

    fn flatten(&self, source: &Map, record: &mut dyn Record) -> Result<(), DataError> {
        MapFormat.flatten(source, record)
    }

    fn refine<'a>(
        &self,
        field: &FieldSpec,
        value: Cow<'a, Value>,
    ) -> Result<Cow<'a, Value>, DataError> {
        let Some(kind) = narrow_kind(field) else {
            return Ok(value);
        };
        let mut value = value.into_owned();
        match field.field_type() {
            FieldType::List => each_item(&mut value, |v| narrow(v, kind)),
            FieldType::Map => each_value(&mut value, |v| narrow(v, kind)),
            FieldType::ListOfMap => each_item(&mut value, |m| each_value(m, |v| narrow(v, kind))),
            FieldType::MapOfMap => each_value(&mut value, |m| each_value(m, |v| narrow(v, kind))),
            _ => narrow(&mut value, kind),
        }
        Ok(Cow::Owned(value))
    }
}

/// Scalar kind numbers are narrowed to, if the field asks for one.
fn narrow_kind(field: &FieldSpec) -> Option<ScalarKind> {
    let kind = match field.field_type() {
        FieldType::Record => return None,
        t if t.is_container() => field.subtype()?,
        t => t.as_scalar()?,
    };
    matches!(kind, ScalarKind::Integer | ScalarKind::Long | ScalarKind::Float).then_some(kind)
}

fn narrow(value: &mut Value, kind: ScalarKind) {
    if let Value::Double(_) = value {
        if let Some(cast) = value.cast(kind) {
            *value = cast;
        }
    }
}

fn each_item(value: &mut Value, mut f: impl FnMut(&mut Value)) {
    if let Value::List(items) = value {
        items.iter_mut().for_each(&mut f);
    }
}

fn each_value(value: &mut Value, mut f: impl FnMut(&mut Value)) {
    if let Value::Map(map) = value {
        map.values_mut().for_each(&mut f);
    }
}

// ════════════════════════════════════════════════════════════════
//  JsonConverter
// ════════════════════════════════════════════════════════════════

/// Converts JSON object text into records.
pub struct JsonConverter {
    inner: RecordConverter<JsonFormat>,
}

impl JsonConverter {
    /// Flatten every top-level entry; numbers stay DOUBLE.
    pub fn without_schema() -> Result<Self, ConvertError> {
        RecordConverter::builder(JsonFormat).build().map(Self::from)
    }

    pub fn with_schema(schema: Schema) -> Result<Self, ConvertError> {
        RecordConverter::builder(JsonFormat).schema(schema).build().map(Self::from)
    }

    pub fn from_config(config: &ConverterConfig) -> Result<Self, ConvertError> {
        RecordConverter::from_config(JsonFormat, config).map(Self::from)
    }

    pub fn convert(&self, json: &str) -> Result<Box<dyn Record>, ConvertError> {
        self.inner.convert(&parse_object(json)?)
    }

    pub fn convert_into(&self, json: &str, record: &mut dyn Record) -> Result<(), ConvertError> {
        self.inner.convert_into(&parse_object(json)?, record)
    }

    pub fn inner(&self) -> &RecordConverter<JsonFormat> {
        &self.inner
    }
}

impl From<RecordConverter<JsonFormat>> for JsonConverter {
    fn from(inner: RecordConverter<JsonFormat>) -> Self {
        Self { inner }
    }
}

//! Avro records as a conversion source.
//!
//! The converter walks `apache_avro` record values directly. Raw datums are
//! decoded first with an [`AvroDecoder`] built from the configured writer
//! schema; object container files carry their own schema.

mod convert;

use std::borrow::Cow;
use std::io::Read;

use apache_avro::Schema as AvroSchema;
use apache_avro::types::Value as AvroValue;
use recast_api::{DataError, Record, Value};
use recast_engine::config::AvroConfig;
use recast_engine::converter::{RecordConverter, SourceFormat};
use recast_engine::schema::Schema;
use recast_engine::{ConvertError, ConverterConfig};

pub use convert::avro_to_value;

// ═══════════════════════════════════════════════════════════════
//  AvroFormat
// ═══════════════════════════════════════════════════════════════

/// Source is an Avro record value.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvroFormat;

fn record_fields(source: &AvroValue) -> Result<&[(String, AvroValue)], DataError> {
    match source {
        AvroValue::Record(fields) => Ok(fields),
        AvroValue::Union(_, inner) => record_fields(inner),
        _ => Err(DataError::type_mismatch("expected an Avro record")),
    }
}

impl SourceFormat for AvroFormat {
    type Source = AvroValue;

    fn name(&self) -> &'static str {
        "avro"
    }

    fn root_get<'a>(
        &self,
        source: &'a AvroValue,
        key: &str,
    ) -> Result<Option<Cow<'a, Value>>, DataError> {
        Ok(record_fields(source)?
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, v)| Cow::Owned(avro_to_value(v))))
    }

    fn flatten(&self, source: &AvroValue, record: &mut dyn Record) -> Result<(), DataError> {
        for (name, v) in record_fields(source)? {
            let value = avro_to_value(v);
            if !value.is_null() {
                record.force_set(name, value);
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  AvroDecoder
// ═══════════════════════════════════════════════════════════════

/// Decodes raw Avro datums against a fixed writer schema.
pub struct AvroDecoder {
    schema: AvroSchema,
}

impl AvroDecoder {
    pub fn new(schema: AvroSchema) -> Self {
        Self { schema }
    }

    pub fn parse(schema_json: &str) -> Result<Self, ConvertError> {
        AvroSchema::parse_str(schema_json)
            .map(Self::new)
            .map_err(|e| ConvertError::Config(format!("avro: failed to parse schema: {e}")))
    }

    /// Build from `avro.schema_file` or inline `avro.schema`. Either is required.
    pub fn from_config(config: &AvroConfig) -> Result<Self, ConvertError> {
        match (&config.schema_file, &config.schema) {
            (Some(path), _) => {
                tracing::debug!(path = %path.display(), "loading avro writer schema");
                let text = std::fs::read_to_string(path).map_err(|e| {
                    ConvertError::Config(format!(
                        "avro: failed to read schema file '{}': {e}",
                        path.display()
                    ))
                })?;
                Self::parse(&text)
            }
            (None, Some(inline)) => Self::parse(inline),
            (None, None) => Err(ConvertError::Config(
                "avro: schema_file or schema is required to decode raw datums".to_string(),
            )),
        }
    }

    pub fn decode(&self, data: &[u8]) -> Result<AvroValue, DataError> {
        let mut reader = data;
        apache_avro::from_avro_datum(&self.schema, &mut reader, None)
            .map_err(|e| DataError::format(format!("avro decode: {e}")))
    }

    pub fn schema(&self) -> &AvroSchema {
        &self.schema
    }
}

/// Read every record of an Avro object container file.
pub fn read_container<R: Read>(
    reader: R,
) -> Result<impl Iterator<Item = Result<AvroValue, DataError>>, DataError> {
    let reader = apache_avro::Reader::new(reader)
        .map_err(|e| DataError::format(format!("avro container: {e}")))?;
    tracing::debug!(schema = ?reader.writer_schema().name(), "opened avro container");
    Ok(reader.map(|item| item.map_err(|e| DataError::format(format!("avro container: {e}")))))
}

// ═══════════════════════════════════════════════════════════════
//  AvroConverter
// ═══════════════════════════════════════════════════════════════

/// Converts Avro records, and raw datums when a decoder is attached.
///
/// Holds no per-call state, so one instance can serve many threads.
pub struct AvroConverter {
    inner: RecordConverter<AvroFormat>,
    decoder: Option<AvroDecoder>,
}

impl AvroConverter {
    pub fn without_schema() -> Result<Self, ConvertError> {
        RecordConverter::builder(AvroFormat).build().map(Self::from)
    }

    pub fn with_schema(schema: Schema) -> Result<Self, ConvertError> {
        RecordConverter::builder(AvroFormat).schema(schema).build().map(Self::from)
    }

    /// Build from configuration. A decoder is attached when an Avro writer
    /// schema is configured.
    pub fn from_config(config: &ConverterConfig) -> Result<Self, ConvertError> {
        let converter = Self::from(RecordConverter::from_config(AvroFormat, config)?);
        if config.avro.schema_file.is_none() && config.avro.schema.is_none() {
            return Ok(converter);
        }
        Ok(converter.with_decoder(AvroDecoder::from_config(&config.avro)?))
    }

    pub fn with_decoder(mut self, decoder: AvroDecoder) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn convert(&self, record: &AvroValue) -> Result<Box<dyn Record>, ConvertError> {
        self.inner.convert(record)
    }

    pub fn convert_into(
        &self,
        source: &AvroValue,
        record: &mut dyn Record,
    ) -> Result<(), ConvertError> {
        self.inner.convert_into(source, record)
    }

    /// Decode a raw datum and convert it.
    pub fn convert_bytes(&self, data: &[u8]) -> Result<Box<dyn Record>, ConvertError> {
        let decoder = self.decoder.as_ref().ok_or_else(|| {
            ConvertError::Config("avro: no writer schema configured for raw datums".to_string())
        })?;
        self.inner.convert(&decoder.decode(data)?)
    }

    pub fn inner(&self) -> &RecordConverter<AvroFormat> {
        &self.inner
    }
}

impl From<RecordConverter<AvroFormat>> for AvroConverter {
    fn from(inner: RecordConverter<AvroFormat>) -> Self {
        Self {
            inner,
            decoder: None,
        }
    }
}

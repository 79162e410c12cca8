use std::borrow::Cow;
use std::sync::Arc;

use recast_api::{DataError, OrderedRecordProvider, Record, RecordProvider, Value};

use crate::coerce;
use crate::config::ConverterConfig;
use crate::error::ConvertError;
use crate::path;
use crate::schema::{FieldSpec, Schema};

// ════════════════════════════════════════════════════════════════
//  SourceFormat
// ════════════════════════════════════════════════════════════════

/// Format-specific capabilities a converter is built over.
///
/// `root_get` resolves the first path token; deeper tokens are walked
/// generically. `flatten` copies the whole source when no schema is set.
pub trait SourceFormat: Send + Sync {
    type Source: ?Sized;

    fn name(&self) -> &'static str;

    fn root_get<'a>(
        &self,
        source: &'a Self::Source,
        key: &str,
    ) -> Result<Option<Cow<'a, Value>>, DataError>;

    fn flatten(&self, source: &Self::Source, record: &mut dyn Record) -> Result<(), DataError>;

    /// Adjust an extracted value before it is assigned.
    fn refine<'a>(
        &self,
        _field: &FieldSpec,
        value: Cow<'a, Value>,
    ) -> Result<Cow<'a, Value>, DataError> {
        Ok(value)
    }

    /// Build-time hook, called once with the converter's schema.
    fn bind(&mut self, _schema: Option<&Schema>) -> Result<(), ConvertError> {
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════
//  RecordConverter
// ════════════════════════════════════════════════════════════════

/// Converts sources of one format into output records.
///
/// Immutable after build; `convert` takes `&self` and may be called from
/// several threads at once.
pub struct RecordConverter<F: SourceFormat> {
    format: F,
    schema: Option<Arc<Schema>>,
    type_check: bool,
    provider: Arc<dyn RecordProvider>,
}

impl<F: SourceFormat> RecordConverter<F> {
    pub fn builder(format: F) -> ConverterBuilder<F> {
        ConverterBuilder {
            format,
            schema: None,
            type_check: true,
            provider: Arc::new(OrderedRecordProvider),
        }
    }

    /// Build from configuration: schema file, type checking and record provider.
    pub fn from_config(format: F, config: &ConverterConfig) -> Result<Self, ConvertError> {
        let mut builder = Self::builder(format)
            .type_check(config.type_check)
            .provider(config.provider()?);
        if let Some(schema) = config.load_schema()? {
            builder = builder.schema(schema);
        }
        builder.build()
    }

    /// Convert `source` into a fresh record.
    pub fn convert(&self, source: &F::Source) -> Result<Box<dyn Record>, ConvertError> {
        let mut record = self.provider.new_record();
        self.convert_into(source, record.as_mut())?;
        Ok(record)
    }

    /// Convert `source` into a caller-supplied record.
    ///
    /// On error the record may hold some fields already; callers discard it.
    pub fn convert_into(
        &self,
        source: &F::Source,
        record: &mut dyn Record,
    ) -> Result<(), ConvertError> {
        let Some(schema) = &self.schema else {
            tracing::trace!(format = self.format.name(), "flattening source without schema");
            return self.format.flatten(source, record).map_err(ConvertError::Data);
        };
        for field in schema.fields() {
            self.convert_field(field, source, record)
                .map_err(|e| ConvertError::Field {
                    field: field.to_string(),
                    source: e,
                })?;
        }
        tracing::trace!(
            format = self.format.name(),
            fields = record.field_count(),
            "converted record"
        );
        Ok(())
    }

    fn convert_field(
        &self,
        field: &FieldSpec,
        source: &F::Source,
        record: &mut dyn Record,
    ) -> Result<(), DataError> {
        let Some(value) = path::extract(&self.format, source, field.tokens())? else {
            return Ok(());
        };
        let value = self.format.refine(field, value)?;
        coerce::assign(field, value.into_owned(), record, self.type_check)
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_deref()
    }

    pub fn type_check(&self) -> bool {
        self.type_check
    }

    pub fn format(&self) -> &F {
        &self.format
    }
}

// ════════════════════════════════════════════════════════════════
//  Builder
// ════════════════════════════════════════════════════════════════

pub struct ConverterBuilder<F: SourceFormat> {
    format: F,
    schema: Option<Arc<Schema>>,
    type_check: bool,
    provider: Arc<dyn RecordProvider>,
}

impl<F: SourceFormat> ConverterBuilder<F> {
    pub fn schema(mut self, schema: impl Into<Arc<Schema>>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Strict type checking of scalar values. On by default.
    pub fn type_check(mut self, enabled: bool) -> Self {
        self.type_check = enabled;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn RecordProvider>) -> Self {
        self.provider = provider;
        self
    }

    pub fn build(mut self) -> Result<RecordConverter<F>, ConvertError> {
        self.format
            .bind(self.schema.as_deref())
            .map_err(|e| e.with_context(self.format.name()))?;
        tracing::info!(
            format = self.format.name(),
            fields = self.schema.as_ref().map_or(0, |s| s.len()),
            type_check = self.type_check,
            provider = self.provider.name(),
            "converter built"
        );
        Ok(RecordConverter {
            format: self.format,
            schema: self.schema,
            type_check: self.type_check,
            provider: self.provider,
        })
    }
}

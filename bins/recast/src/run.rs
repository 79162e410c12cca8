use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use recast_api::{DataError, Record};
use recast_engine::config::{ConverterConfig, FormatKind};
use recast_engine::map::{MapConverter, MapFormat};
use recast_engine::ConvertError;
use recast_format_avro::{AvroConverter, AvroDecoder, read_container};
use recast_format_json::{JsonConverter, parse_object_exact};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub converted: usize,
    pub failed: usize,
}

impl Summary {
    fn record(&mut self, outcome: Result<(), ConvertError>, position: usize) {
        match outcome {
            Ok(()) => self.converted += 1,
            Err(e) => {
                tracing::error!(position, error = %e, "dropping record");
                self.failed += 1;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  convert
// ════════════════════════════════════════════════════════════════

pub fn convert(
    config: &ConverterConfig,
    input: Option<&Path>,
    raw: bool,
) -> Result<Summary, ConvertError> {
    reject_pojo(config)?;
    let reader: Box<dyn Read> = match input {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(std::io::stdin().lock()),
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    convert_stream(config, reader, &mut out, raw)
}

/// Convert everything `reader` yields, writing one JSON line per record.
///
/// A record that fails to convert is logged and dropped; the stream goes on.
pub fn convert_stream<R: Read, W: Write>(
    config: &ConverterConfig,
    reader: R,
    out: &mut W,
    raw: bool,
) -> Result<Summary, ConvertError> {
    match config.format {
        FormatKind::Json => {
            let converter = JsonConverter::from_config(config)?;
            convert_lines(reader, out, |line| converter.convert(line))
        }
        FormatKind::Map => {
            let converter = MapConverter::from_config(MapFormat, config)?;
            convert_lines(reader, out, |line| {
                converter.convert(&parse_object_exact(line)?)
            })
        }
        FormatKind::Avro if raw => {
            if config.avro.schema_file.is_none() && config.avro.schema.is_none() {
                return Err(ConvertError::Config(
                    "--raw needs avro.schema_file or avro.schema".to_string(),
                ));
            }
            let converter = AvroConverter::from_config(config)?;
            let mut bytes = Vec::new();
            let mut reader = reader;
            reader.read_to_end(&mut bytes)?;
            let mut summary = Summary::default();
            let outcome = converter
                .convert_bytes(&bytes)
                .and_then(|record| emit(out, record.as_ref()));
            summary.record(outcome, 0);
            Ok(summary)
        }
        FormatKind::Avro => {
            let converter = AvroConverter::from_config(config)?;
            let mut summary = Summary::default();
            for (position, item) in read_container(reader)?.enumerate() {
                let outcome = item
                    .map_err(ConvertError::Data)
                    .and_then(|value| converter.convert(&value))
                    .and_then(|record| emit(out, record.as_ref()));
                summary.record(outcome, position);
            }
            Ok(summary)
        }
        FormatKind::Pojo => Err(pojo_error()),
    }
}

fn convert_lines<R, W, C>(reader: R, out: &mut W, convert: C) -> Result<Summary, ConvertError>
where
    R: Read,
    W: Write,
    C: Fn(&str) -> Result<Box<dyn Record>, ConvertError>,
{
    let mut summary = Summary::default();
    for (position, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let outcome = convert(&line).and_then(|record| emit(out, record.as_ref()));
        summary.record(outcome, position + 1);
    }
    Ok(summary)
}

/// Serialized from the ordered snapshot so fields keep their insertion order.
fn emit<W: Write>(out: &mut W, record: &dyn Record) -> Result<(), ConvertError> {
    let json = serde_json::to_string(&record.to_map()).map_err(DataError::from)?;
    writeln!(out, "{json}")?;
    Ok(())
}

// ════════════════════════════════════════════════════════════════
//  check
// ════════════════════════════════════════════════════════════════

/// Validate everything a `convert` run would build, without reading input.
pub fn check(config: &ConverterConfig) -> Result<String, ConvertError> {
    reject_pojo(config)?;
    config.validate()?;
    let schema = config.load_schema()?;
    if config.format == FormatKind::Avro
        && (config.avro.schema_file.is_some() || config.avro.schema.is_some())
    {
        AvroDecoder::from_config(&config.avro)?;
    }
    Ok(match schema {
        Some(schema) => format!(
            "ok: format={}, fields={}, type_check={}",
            config.format,
            schema.len(),
            config.type_check
        ),
        None => format!("ok: format={}, no schema", config.format),
    })
}

fn reject_pojo(config: &ConverterConfig) -> Result<(), ConvertError> {
    if config.format == FormatKind::Pojo {
        return Err(pojo_error());
    }
    Ok(())
}

fn pojo_error() -> ConvertError {
    ConvertError::Config(
        "format 'pojo' converts Rust types and cannot be selected from configuration".to_string(),
    )
}

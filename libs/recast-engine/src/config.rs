use std::path::{Path, PathBuf};
use std::sync::Arc;

use recast_api::{RecordProvider, provider_from_name};
use serde::Deserialize;

use crate::error::ConvertError;
use crate::schema::Schema;

/// Root configuration, parsed from TOML by default.
#[derive(Debug, Clone, Deserialize)]
pub struct RecastConfig {
    pub converter: ConverterConfig,
}

/// Which adapter backs a converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Map,
    Json,
    Avro,
    /// Reflected Rust types. Needs a compile-time type, so it can only be
    /// built in code.
    Pojo,
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatKind::Map => f.write_str("map"),
            FormatKind::Json => f.write_str("json"),
            FormatKind::Avro => f.write_str("avro"),
            FormatKind::Pojo => f.write_str("pojo"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverterConfig {
    pub format: FormatKind,

    /// Schema document name; no schema means flatten everything.
    #[serde(default)]
    pub schema_file: Option<String>,

    #[serde(default = "default_type_check")]
    pub type_check: bool,

    #[serde(default = "default_record_provider")]
    pub record_provider: String,

    /// Directories searched for `schema_file` before the filesystem.
    #[serde(default)]
    pub resource_dirs: Vec<PathBuf>,

    #[serde(default)]
    pub avro: AvroConfig,

    /// Log filter used by the CLI when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_level: Option<String>,
}

/// Writer schema for decoding raw Avro datums.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvroConfig {
    #[serde(default)]
    pub schema_file: Option<PathBuf>,
    /// Inline schema JSON.
    #[serde(default)]
    pub schema: Option<String>,
}

fn default_type_check() -> bool {
    true
}

fn default_record_provider() -> String {
    "ordered".to_string()
}

impl ConverterConfig {
    pub fn new(format: FormatKind) -> Self {
        Self {
            format,
            schema_file: None,
            type_check: default_type_check(),
            record_provider: default_record_provider(),
            resource_dirs: Vec::new(),
            avro: AvroConfig::default(),
            log_level: None,
        }
    }

    /// Load and validate the configured schema, if any.
    pub fn load_schema(&self) -> Result<Option<Arc<Schema>>, ConvertError> {
        self.schema_file
            .as_deref()
            .map(|name| Schema::load(name, &self.resource_dirs).map(Arc::new))
            .transpose()
    }

    pub fn provider(&self) -> Result<Arc<dyn RecordProvider>, ConvertError> {
        provider_from_name(&self.record_provider)
            .map(Arc::from)
            .ok_or_else(|| {
                ConvertError::Config(format!(
                    "unknown record provider '{}'",
                    self.record_provider
                ))
            })
    }

    /// Check settings that do not need any file to be read.
    pub fn validate(&self) -> Result<(), ConvertError> {
        self.provider()?;
        if self.avro.schema_file.is_some() && self.avro.schema.is_some() {
            return Err(ConvertError::Config(
                "avro.schema_file and avro.schema are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════
//  Parsers
// ════════════════════════════════════════════════════════════════

/// Parses a configuration document of some format into [`RecastConfig`].
pub trait ConfigParser {
    /// File extensions handled by this parser, without the dot.
    fn extensions(&self) -> &[&str];

    fn parse(&self, content: &str) -> Result<RecastConfig, ConvertError>;
}

pub struct TomlParser;

impl ConfigParser for TomlParser {
    fn extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn parse(&self, content: &str) -> Result<RecastConfig, ConvertError> {
        RecastConfig::parse(content)
    }
}

impl RecastConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, ConvertError> {
        Self::load_with(path, &[])
    }

    /// Load configuration, picking a parser by file extension.
    ///
    /// Files whose extension no parser claims are read as TOML.
    pub fn load_with(path: &str, parsers: &[&dyn ConfigParser]) -> Result<Self, ConvertError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConvertError::Config(format!("{path}: {e}")))?;
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let parser = parsers
            .iter()
            .copied()
            .find(|p| p.extensions().contains(&ext))
            .unwrap_or(&TomlParser);
        let config = parser.parse(&content).map_err(|e| e.with_context(path))?;
        config.converter.validate().map_err(|e| e.with_context(path))?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, ConvertError> {
        toml::from_str(toml_str).map_err(|e| ConvertError::Config(e.to_string()))
    }
}

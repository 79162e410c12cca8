pub mod coerce;
pub mod config;
pub mod converter;
pub mod error;
pub mod map;
pub mod path;
pub mod pojo;
pub mod schema;

pub use config::{ConfigParser, ConverterConfig, FormatKind, RecastConfig};
pub use converter::{ConverterBuilder, RecordConverter, SourceFormat};
pub use error::ConvertError;
pub use map::{MapConverter, MapFormat};
pub use pojo::{AccessorResolver, Classification, PojoConverter, PojoFormat};
pub use schema::{FieldDecl, FieldSpec, FieldType, Schema, SchemaError};

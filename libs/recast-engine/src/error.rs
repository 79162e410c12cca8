use recast_api::DataError;

use crate::schema::SchemaError;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid schema: {}", join(.0))]
    InvalidSchema(Vec<SchemaError>),

    #[error("schema file error: {0}")]
    SchemaFile(String),

    /// Reflective accessor resolution failed while building a converter.
    #[error("accessor error: {0}")]
    Accessor(String),

    /// A single field failed while converting a record.
    #[error("could not convert field: {field}")]
    Field {
        field: String,
        #[source]
        source: DataError,
    },

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Add context to the error.
    ///
    /// For `Data` variant, context is added to the inner `DataError`.
    /// For message variants, context is prepended to the message.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            ConvertError::Data(e) => ConvertError::Data(e.with_context(ctx)),
            ConvertError::Config(msg) => ConvertError::Config(format!("{ctx}: {msg}")),
            ConvertError::SchemaFile(msg) => ConvertError::SchemaFile(format!("{ctx}: {msg}")),
            ConvertError::Accessor(msg) => ConvertError::Accessor(format!("{ctx}: {msg}")),
            other => other,
        }
    }

    /// Schema validation errors, if this is an `InvalidSchema`.
    pub fn schema_errors(&self) -> &[SchemaError] {
        match self {
            ConvertError::InvalidSchema(errors) => errors,
            _ => &[],
        }
    }
}

fn join(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

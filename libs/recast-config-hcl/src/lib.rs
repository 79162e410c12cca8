use recast_engine::config::{ConfigParser, RecastConfig};
use recast_engine::error::ConvertError;

pub struct HclParser;

impl ConfigParser for HclParser {
    fn extensions(&self) -> &[&str] {
        &["hcl"]
    }

    fn parse(&self, content: &str) -> Result<RecastConfig, ConvertError> {
        hcl::from_str(content).map_err(|e| ConvertError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_engine::config::FormatKind;

    #[test]
    fn parses_converter_block() {
        let config = HclParser
            .parse(
                r#"
                converter {
                  format         = "avro"
                  schema_file    = "orders.json"
                  type_check     = false
                  resource_dirs  = ["schemas", "/etc/recast"]

                  avro {
                    schema_file = "orders.avsc"
                  }
                }
                "#,
            )
            .unwrap();
        let c = config.converter;
        assert_eq!(c.format, FormatKind::Avro);
        assert!(!c.type_check);
        assert_eq!(c.resource_dirs.len(), 2);
        assert!(c.avro.schema_file.is_some());
    }

    #[test]
    fn claims_hcl_extension() {
        assert_eq!(HclParser.extensions(), ["hcl"]);
    }
}

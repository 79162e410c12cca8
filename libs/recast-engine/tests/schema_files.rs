use std::io::Write;

use recast_api::{Map, Record, Value};
use recast_engine::{
    ConvertError, ConverterConfig, FormatKind, MapConverter, MapFormat, RecastConfig, Schema,
    SchemaError,
};

const ORDERS: &str = r#"{
  "fields": [
    {"name": "id", "type": "LONG"},
    {"name": "city", "reference": "address.city", "type": "STRING"}
  ]
}"#;

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn resource_dirs_are_searched_before_the_filesystem() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write(&second, "orders.json", ORDERS);

    let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let schema = Schema::load("orders.json", &dirs).unwrap();
    assert_eq!(schema.len(), 2);

    let absolute = write(&first, "plain.json", ORDERS);
    let schema = Schema::load(absolute.to_str().unwrap(), &[]).unwrap();
    assert_eq!(schema.field("city").unwrap().tokens(), ["address", "city"]);
}

#[test]
fn missing_schema_file_is_reported() {
    let err = Schema::load("nowhere.json", &[]).unwrap_err();
    assert!(matches!(err, ConvertError::SchemaFile(_)));
}

#[test]
fn invalid_schema_lists_every_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        "bad.json",
        r#"[{"type": "STRING"}, {"name": "n", "type": "INTEGER", "subtype": "LONG"}]"#,
    );
    let err = Schema::load(path.to_str().unwrap(), &[]).unwrap_err();
    assert_eq!(
        err.schema_errors(),
        [SchemaError::FieldRequiresName, SchemaError::ScalarRequiresNullSubtype]
    );
}

#[test]
fn converter_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir, "orders.json", ORDERS);
    let config_path = write(
        &dir,
        "recast.toml",
        &format!(
            "[converter]\nformat = \"map\"\nschema_file = \"orders.json\"\nresource_dirs = [{:?}]\n",
            dir.path().display().to_string()
        ),
    );

    let config = RecastConfig::load(config_path.to_str().unwrap()).unwrap();
    assert_eq!(config.converter.format, FormatKind::Map);
    let converter = MapConverter::from_config(MapFormat, &config.converter).unwrap();

    let mut address = Map::new();
    address.insert("city", "Oslo");
    let mut source = Map::new();
    source.insert("id", 9i64);
    source.insert("address", address);
    source.insert("extra", true);

    let record = converter.convert(&source).unwrap();
    assert_eq!(record.fields(), vec!["id", "city"]);
    assert_eq!(record.get("city"), Some(&Value::from("Oslo")));
}

#[test]
fn unknown_provider_fails_the_build() {
    let mut config = ConverterConfig::new(FormatKind::Map);
    config.record_provider = "com.example.Missing".into();
    assert!(matches!(
        MapConverter::from_config(MapFormat, &config),
        Err(ConvertError::Config(_))
    ));
}

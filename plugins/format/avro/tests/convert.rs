use apache_avro::Schema as AvroSchema;
use apache_avro::types::Value as AvroValue;
use pretty_assertions::assert_eq;
use recast_api::{ScalarKind, Value};
use recast_engine::config::AvroConfig;
use recast_engine::{ConvertError, ConverterConfig, FieldDecl, FieldType, FormatKind, Schema};
use recast_format_avro::{AvroConverter, AvroDecoder, read_container};

const ORDER_SCHEMA: &str = r#"{
  "type": "record",
  "name": "Order",
  "fields": [
    {"name": "id", "type": "long"},
    {"name": "note", "type": ["null", "string"], "default": null},
    {"name": "tags", "type": {"type": "array", "items": "string"}},
    {"name": "attrs", "type": {"type": "map", "values": "int"}},
    {"name": "customer", "type": {
      "type": "record",
      "name": "Customer",
      "fields": [
        {"name": "name", "type": "string"},
        {"name": "tier", "type": ["null", "int"], "default": null}
      ]
    }}
  ]
}"#;

fn order(note: Option<&str>, tags: &[&str]) -> AvroValue {
    let note = match note {
        Some(n) => AvroValue::Union(1, Box::new(AvroValue::String(n.into()))),
        None => AvroValue::Union(0, Box::new(AvroValue::Null)),
    };
    AvroValue::Record(vec![
        ("id".into(), AvroValue::Long(42)),
        ("note".into(), note),
        (
            "tags".into(),
            AvroValue::Array(tags.iter().map(|t| AvroValue::String(t.to_string())).collect()),
        ),
        (
            "attrs".into(),
            AvroValue::Map([("qty".to_string(), AvroValue::Int(3))].into_iter().collect()),
        ),
        (
            "customer".into(),
            AvroValue::Record(vec![
                ("name".into(), AvroValue::String("ada".into())),
                ("tier".into(), AvroValue::Union(0, Box::new(AvroValue::Null))),
            ]),
        ),
    ])
}

fn schema(decls: Vec<FieldDecl>) -> Schema {
    Schema::new(decls).unwrap()
}

#[test]
fn walks_nested_records_and_maps() {
    let converter = AvroConverter::with_schema(schema(vec![
        FieldDecl::new("id", FieldType::Long),
        FieldDecl::new("customer_name", FieldType::String).with_reference("customer.name"),
        FieldDecl::new("qty", FieldType::Integer).with_reference("attrs.qty"),
        FieldDecl::new("first_tag", FieldType::String).with_reference("tags.0"),
        FieldDecl::new("note", FieldType::String),
        FieldDecl::new("absent", FieldType::String).with_reference("nothing"),
    ]))
    .unwrap();

    let record = converter.convert(&order(None, &["a", "b"])).unwrap();
    assert_eq!(record.fields(), vec!["id", "customer_name", "qty", "first_tag"]);
    assert_eq!(record.get("qty"), Some(&Value::Int(3)));
    assert_eq!(record.get("first_tag"), Some(&Value::from("a")));
}

#[test]
fn record_field_flattens_nested_avro_record() {
    let converter = AvroConverter::with_schema(schema(vec![FieldDecl::record("customer")])).unwrap();
    let record = converter.convert(&order(None, &[])).unwrap();
    assert_eq!(record.fields(), vec!["name"]);
}

#[test]
fn empty_array_satisfies_declared_list() {
    let converter = AvroConverter::with_schema(schema(vec![
        FieldDecl::new("tags", FieldType::List).with_subtype(ScalarKind::String),
    ]))
    .unwrap();
    let record = converter.convert(&order(Some("n"), &[])).unwrap();
    assert_eq!(record.get("tags"), Some(&Value::List(vec![])));
}

#[test]
fn flattens_top_level_fields_without_schema() {
    let converter = AvroConverter::without_schema().unwrap();
    let record = converter.convert(&order(Some("rush"), &["x"])).unwrap();
    assert_eq!(record.fields(), vec!["id", "note", "tags", "attrs", "customer"]);
    assert_eq!(record.get("note"), Some(&Value::from("rush")));
}

#[test]
fn decodes_raw_datums_with_configured_schema() {
    let avro_schema = AvroSchema::parse_str(ORDER_SCHEMA).unwrap();
    let bytes = apache_avro::to_avro_datum(&avro_schema, order(Some("n"), &["t"])).unwrap();

    let mut config = ConverterConfig::new(FormatKind::Avro);
    config.avro = AvroConfig {
        schema_file: None,
        schema: Some(ORDER_SCHEMA.to_string()),
    };
    let converter = AvroConverter::from_config(&config).unwrap();
    let record = converter.convert_bytes(&bytes).unwrap();
    assert_eq!(record.get("id"), Some(&Value::Long(42)));
    assert_eq!(record.get("note"), Some(&Value::from("n")));

    assert!(matches!(
        converter.convert_bytes(&[0xff]),
        Err(ConvertError::Data(_))
    ));
}

#[test]
fn raw_datums_need_a_writer_schema() {
    assert!(matches!(
        AvroDecoder::from_config(&AvroConfig::default()),
        Err(ConvertError::Config(_))
    ));
    let converter = AvroConverter::without_schema().unwrap();
    assert!(matches!(converter.convert_bytes(&[]), Err(ConvertError::Config(_))));
}

#[test]
fn reads_schema_file_and_container_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("order.avsc");
    std::fs::write(&path, ORDER_SCHEMA).unwrap();
    let decoder = AvroDecoder::from_config(&AvroConfig {
        schema_file: Some(path),
        schema: None,
    })
    .unwrap();

    let mut writer = apache_avro::Writer::new(decoder.schema(), Vec::new());
    writer.append(order(None, &["a"])).unwrap();
    writer.append(order(Some("b"), &[])).unwrap();
    let bytes = writer.into_inner().unwrap();

    let converter = AvroConverter::without_schema().unwrap();
    let notes: Vec<_> = read_container(bytes.as_slice())
        .unwrap()
        .map(|item| {
            let record = converter.convert(&item.unwrap()).unwrap();
            record.get("note").cloned()
        })
        .collect();
    assert_eq!(notes, vec![None, Some(Value::from("b"))]);
}

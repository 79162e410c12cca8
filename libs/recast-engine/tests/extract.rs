use proptest::prelude::*;
use recast_api::{ErrorKind, Map, Record, ScalarKind, Value};
use recast_engine::path::extract;
use recast_engine::{ConvertError, FieldDecl, FieldType, MapConverter, MapFormat, Schema};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::Int),
        any::<i64>().prop_map(Value::Long),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

fn tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::vec(("[a-c]", inner), 0..4)
                .prop_map(|entries| Value::Map(entries.into_iter().collect())),
        ]
    })
}

fn path() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop_oneof!["[a-c]", "[0-3]"], 1..4)
}

proptest! {
    #[test]
    fn extraction_is_idempotent(
        entries in prop::collection::vec(("[a-c]", tree()), 0..4),
        tokens in path(),
    ) {
        let source: Map = entries.into_iter().collect();
        let before = source.clone();
        let first = extract(&MapFormat, &source, &tokens).map(|v| v.map(|v| v.into_owned()));
        let second = extract(&MapFormat, &source, &tokens).map(|v| v.map(|v| v.into_owned()));
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.message, b.message),
            (a, b) => prop_assert!(false, "diverged: {:?} vs {:?}", a, b),
        }
        prop_assert_eq!(source, before);
    }
}

#[test]
fn bad_index_names_the_field() {
    let schema = Schema::new(vec![
        FieldDecl::new("second", FieldType::String).with_reference("tags.5"),
    ])
    .unwrap();
    let converter = MapConverter::builder(MapFormat).schema(schema).build().unwrap();
    let mut source = Map::new();
    source.insert("tags", vec!["a", "b"]);

    match converter.convert(&source) {
        Err(ConvertError::Field { field, source }) => {
            assert!(field.contains("reference: tags.5"), "{field}");
            assert_eq!(source.kind, ErrorKind::Path);
        }
        other => panic!("expected a field error, got {:?}", other.map(|r| r.to_map())),
    }
}

#[test]
fn empty_list_satisfies_declared_list_type() {
    let schema = Schema::new(vec![
        FieldDecl::new("list", FieldType::List).with_subtype(ScalarKind::String),
    ])
    .unwrap();
    let converter = MapConverter::builder(MapFormat).schema(schema).build().unwrap();
    let mut source = Map::new();
    source.insert("list", Value::List(vec![]));
    let record = converter.convert(&source).unwrap();
    assert_eq!(record.get("list"), Some(&Value::List(vec![])));
}

#[test]
fn failed_field_aborts_the_whole_record() {
    let schema = Schema::new(vec![
        FieldDecl::new("a", FieldType::Integer),
        FieldDecl::new("b", FieldType::Integer),
    ])
    .unwrap();
    let converter = MapConverter::builder(MapFormat).schema(schema).build().unwrap();
    let mut source = Map::new();
    source.insert("a", 1);
    source.insert("b", "two");
    assert!(matches!(converter.convert(&source), Err(ConvertError::Field { .. })));
}

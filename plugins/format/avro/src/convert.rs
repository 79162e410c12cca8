use apache_avro::types::Value as AvroValue;
use recast_api::{Map, Value};

// ═══════════════════════════════════════════════════════════════
//  Avro → Value conversion
// ═══════════════════════════════════════════════════════════════

/// Convert an Avro value into the shared value model.
///
/// Unions unwrap to their branch, enums and UUIDs become strings, logical
/// dates and times keep their INTEGER/LONG carriers, binary data becomes
/// `Bytes`. A decimal without a byte form becomes null. Nested records stay
/// records so they can be walked and flattened.
pub fn avro_to_value(value: &AvroValue) -> Value {
    match value {
        AvroValue::Null => Value::Null,
        AvroValue::Boolean(b) => Value::Bool(*b),
        AvroValue::Int(i) => Value::Int(*i),
        AvroValue::Long(l) => Value::Long(*l),
        AvroValue::Float(f) => Value::Float(*f),
        AvroValue::Double(d) => Value::Double(*d),
        AvroValue::Bytes(b) | AvroValue::Fixed(_, b) => Value::Bytes(b.clone()),
        AvroValue::String(s) | AvroValue::Enum(_, s) => Value::String(s.clone()),
        AvroValue::Union(_, inner) => avro_to_value(inner),
        AvroValue::Array(items) => Value::List(items.iter().map(avro_to_value).collect()),
        AvroValue::Map(entries) => {
            let mut pairs: Vec<_> = entries.iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));
            Value::Map(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.clone(), avro_to_value(v)))
                    .collect(),
            )
        }
        AvroValue::Record(fields) => Value::Record(record_entries(fields)),
        AvroValue::Date(d) => Value::Int(*d),
        AvroValue::TimeMillis(t) => Value::Int(*t),
        AvroValue::TimeMicros(t) => Value::Long(*t),
        AvroValue::TimestampMillis(t) => Value::Long(*t),
        AvroValue::TimestampMicros(t) => Value::Long(*t),
        AvroValue::TimestampNanos(t) => Value::Long(*t),
        AvroValue::Decimal(d) => match Vec::<u8>::try_from(d) {
            Ok(bytes) => Value::Bytes(bytes),
            Err(e) => {
                tracing::warn!(error = %e, "dropping decimal that has no byte form");
                Value::Null
            }
        },
        AvroValue::BigDecimal(d) => Value::String(d.to_string()),
        AvroValue::Uuid(u) => Value::String(u.to_string()),
        AvroValue::Duration(_) => Value::Null,
        AvroValue::LocalTimestampMillis(t) => Value::Long(*t),
        AvroValue::LocalTimestampMicros(t) => Value::Long(*t),
        AvroValue::LocalTimestampNanos(t) => Value::Long(*t),
    }
}

pub(crate) fn record_entries(fields: &[(String, AvroValue)]) -> Map {
    fields
        .iter()
        .map(|(name, v)| (name.clone(), avro_to_value(v)))
        .collect()
}

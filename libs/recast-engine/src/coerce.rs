//! Field assignment: type checks, casts and `RECORD` flattening.

use recast_api::{DataError, Record, Type, TypedValue, Value};

use crate::schema::{FieldSpec, FieldType};

/// Store `value` into `record` as declared by `field`.
///
/// With `type_check` on, the inferred type of the value must equal the
/// declared one; an empty container (whose element type cannot be inferred)
/// takes the declared container type instead. With it off, scalars are cast
/// to the declared kind and containers are stored as-is.
pub fn assign(
    field: &FieldSpec,
    value: Value,
    record: &mut dyn Record,
    type_check: bool,
) -> Result<(), DataError> {
    if value.is_null() {
        return Ok(());
    }
    if field.field_type() == FieldType::Record {
        return flatten_into(value, record);
    }

    let name = field.name().unwrap_or(field.reference());
    let Some(expected) = field.expected_type() else {
        return Err(DataError::type_mismatch(format!(
            "{} field has no element type",
            field.field_type()
        )));
    };

    if type_check {
        let actual = resolve_empty(expected, Type::infer(&value));
        if actual != expected {
            return Err(DataError::type_mismatch(format!(
                "expected {expected}, found {actual}"
            )));
        }
        record.typed_set(name, TypedValue::with_type(expected, value));
        return Ok(());
    }

    match field.field_type().as_scalar() {
        Some(kind) => {
            let cast = value.cast(kind).ok_or_else(|| {
                DataError::type_mismatch(format!(
                    "cannot cast {} to {kind}",
                    Type::infer(&value)
                ))
            })?;
            record.typed_set(name, TypedValue::with_type(expected, cast));
        }
        None => record.force_set(name, value),
    }
    Ok(())
}

/// Copy every non-null entry of a map or nested record into `record`.
pub fn flatten_into(value: Value, record: &mut dyn Record) -> Result<(), DataError> {
    match value {
        Value::Map(entries) | Value::Record(entries) => {
            for (key, v) in entries {
                if !v.is_null() {
                    record.force_set(&key, v);
                }
            }
            Ok(())
        }
        other => Err(DataError::type_mismatch(format!(
            "RECORD field expects a map or a nested record, found {}",
            Type::infer(&other)
        ))),
    }
}

/// An inferred "unknown" container type carries no evidence, so it resolves
/// to the expected type when the container shapes agree.
fn resolve_empty(expected: Type, actual: Type) -> Type {
    let compatible = match actual {
        Type::UnknownList | Type::UnknownListOfMap => {
            matches!(expected, Type::List(_) | Type::ListOfMap(_))
        }
        Type::UnknownMap | Type::UnknownMapOfMap => {
            matches!(expected, Type::Map(_) | Type::MapOfMap(_))
        }
        _ => false,
    };
    if compatible { expected } else { actual }
}

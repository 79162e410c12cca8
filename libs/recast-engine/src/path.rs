//! Dotted-path extraction.
//!
//! The first token goes through the format's root accessor; every later
//! token walks the value generically. A missing segment or a null value
//! ends the walk with `None`.

use std::borrow::Cow;

use recast_api::{DataError, Value};

use crate::converter::SourceFormat;

/// Walk `tokens` over `source`.
pub fn extract<'a, F>(
    format: &F,
    source: &'a F::Source,
    tokens: &[String],
) -> Result<Option<Cow<'a, Value>>, DataError>
where
    F: SourceFormat + ?Sized,
{
    let Some((root, rest)) = tokens.split_first() else {
        return Ok(None);
    };
    let mut value = match format.root_get(source, root)? {
        Some(v) if !v.is_null() => v,
        _ => return Ok(None),
    };
    for token in rest {
        value = match step(value, token)? {
            Some(v) if !v.is_null() => v,
            _ => return Ok(None),
        };
    }
    Ok(Some(value))
}

/// Apply one token to an already extracted value.
///
/// Lists take a numeric index, maps and nested records take a key.
/// Anything else yields `None`.
pub fn get<'v>(value: &'v Value, token: &str) -> Result<Option<&'v Value>, DataError> {
    match value {
        Value::List(items) => {
            let index = parse_index(token, items.len())?;
            Ok(items.get(index))
        }
        Value::Map(map) | Value::Record(map) => Ok(map.get(token)),
        _ => Ok(None),
    }
}

fn step<'a>(value: Cow<'a, Value>, token: &str) -> Result<Option<Cow<'a, Value>>, DataError> {
    match value {
        Cow::Borrowed(v) => Ok(get(v, token)?.map(Cow::Borrowed)),
        Cow::Owned(v) => Ok(take(v, token)?.map(Cow::Owned)),
    }
}

fn take(value: Value, token: &str) -> Result<Option<Value>, DataError> {
    match value {
        Value::List(mut items) => {
            let index = parse_index(token, items.len())?;
            Ok(Some(items.swap_remove(index)))
        }
        Value::Map(mut map) | Value::Record(mut map) => Ok(map.remove(token)),
        _ => Ok(None),
    }
}

fn parse_index(token: &str, len: usize) -> Result<usize, DataError> {
    let index: usize = token
        .parse()
        .map_err(|e| DataError::path(format!("invalid list index '{token}': {e}")))?;
    if index >= len {
        return Err(DataError::path(format!(
            "list index {index} out of range for length {len}"
        )));
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recast_api::{ErrorKind, Map};

    fn nested() -> Value {
        let mut inner = Map::new();
        inner.insert("k", "v");
        let mut root = Map::new();
        root.insert("list", Value::List(vec![Value::Int(1), Value::Map(inner)]));
        root.insert("nothing", Value::Null);
        Value::Map(root)
    }

    #[test]
    fn walks_lists_and_maps() {
        let root = nested();
        let list = get(&root, "list").unwrap().unwrap();
        let entry = get(list, "1").unwrap().unwrap();
        assert_eq!(get(entry, "k").unwrap(), Some(&Value::from("v")));
    }

    #[test]
    fn missing_keys_and_scalars_yield_none() {
        let root = nested();
        assert_eq!(get(&root, "absent").unwrap(), None);
        assert_eq!(get(&Value::Int(3), "x").unwrap(), None);
    }

    #[test]
    fn bad_index_is_an_error() {
        let root = nested();
        let list = get(&root, "list").unwrap().unwrap();
        assert_eq!(get(list, "2").unwrap_err().kind, ErrorKind::Path);
        assert_eq!(get(list, "x").unwrap_err().kind, ErrorKind::Path);
        assert_eq!(get(list, "-1").unwrap_err().kind, ErrorKind::Path);
        assert_eq!(get(&Value::List(vec![]), "0").unwrap_err().kind, ErrorKind::Path);
    }

    #[test]
    fn owned_values_walk_like_borrowed_ones() {
        let owned = step(Cow::Owned(nested()), "list").unwrap().unwrap();
        let owned = step(owned, "1").unwrap().unwrap();
        let owned = step(owned, "k").unwrap().unwrap();
        assert_eq!(owned.into_owned(), Value::from("v"));
    }
}

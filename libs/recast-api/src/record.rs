use std::collections::HashMap;

use crate::error::DataError;
use crate::types::{Type, TypedValue};
use crate::value::{Map, Value};

/// Output record filled by a converter.
///
/// Implementations keep a type tag next to every value. `typed_set` stores the
/// tag it is given; `force_set` bypasses typing and records the inferred tag.
pub trait Record: Send {
    fn typed_set(&mut self, name: &str, value: TypedValue);

    fn force_set(&mut self, name: &str, value: Value);

    fn get(&self, name: &str) -> Option<&Value>;

    fn type_of(&self, name: &str) -> Option<Type>;

    fn field_count(&self) -> usize;

    /// Field names in insertion order.
    fn fields(&self) -> Vec<&str>;

    /// Snapshot of the record as a plain value map.
    fn to_map(&self) -> Map;

    fn to_json(&self) -> Result<serde_json::Value, DataError> {
        Ok(serde_json::to_value(self.to_map())?)
    }
}

// ════════════════════════════════════════════════════════════════
//  OrderedRecord
// ════════════════════════════════════════════════════════════════

/// Insertion-ordered record. Setting an existing field replaces it in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedRecord {
    entries: Vec<(String, TypedValue)>,
    index: HashMap<String, usize>,
}

impl OrderedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn typed(&self, name: &str) -> Option<&TypedValue> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    fn put(&mut self, name: &str, value: TypedValue) {
        match self.index.get(name) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), value));
            }
        }
    }
}

impl Record for OrderedRecord {
    fn typed_set(&mut self, name: &str, value: TypedValue) {
        self.put(name, value);
    }

    fn force_set(&mut self, name: &str, value: Value) {
        self.put(name, TypedValue::infer(value));
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.typed(name).map(|t| &t.value)
    }

    fn type_of(&self, name: &str) -> Option<Type> {
        self.typed(name).map(|t| t.ty)
    }

    fn field_count(&self) -> usize {
        self.entries.len()
    }

    fn fields(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    fn to_map(&self) -> Map {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }
}

// ════════════════════════════════════════════════════════════════
//  Provider
// ════════════════════════════════════════════════════════════════

/// Factory for output records, chosen once when a converter is built.
pub trait RecordProvider: Send + Sync {
    fn name(&self) -> &str;

    fn new_record(&self) -> Box<dyn Record>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderedRecordProvider;

impl RecordProvider for OrderedRecordProvider {
    fn name(&self) -> &str {
        "ordered"
    }

    fn new_record(&self) -> Box<dyn Record> {
        Box::new(OrderedRecord::new())
    }
}

/// Resolve a provider by its configured identifier.
pub fn provider_from_name(name: &str) -> Option<Box<dyn RecordProvider>> {
    match name {
        "ordered" => Some(Box::new(OrderedRecordProvider)),
        _ => None,
    }
}

use std::borrow::Cow;

use recast_api::{DataError, Map, Record, Value};

use crate::converter::{RecordConverter, SourceFormat};

/// Source is a string-keyed map.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapFormat;

pub type MapConverter = RecordConverter<MapFormat>;

impl SourceFormat for MapFormat {
    type Source = Map;

    fn name(&self) -> &'static str {
        "map"
    }

    fn root_get<'a>(&self, source: &'a Map, key: &str) -> Result<Option<Cow<'a, Value>>, DataError> {
        Ok(source.get(key).map(Cow::Borrowed))
    }

    fn flatten(&self, source: &Map, record: &mut dyn Record) -> Result<(), DataError> {
        for (key, value) in source.iter() {
            if !value.is_null() {
                record.force_set(key, value.clone());
            }
        }
        Ok(())
    }
}

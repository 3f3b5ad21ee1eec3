//! Decoding of the JSON-encoded `filter`, `sort` and `range` query parameters.

use crate::errors::{QueryError, Result};
use crate::filter::FilterMap;
use crate::range::RangeRequest;
use crate::sort::SortRequest;
use serde_json::Value as JsonValue;
use tracing::debug;

/// Filter key carrying the free-text search term.
pub const SEARCH_KEY: &str = "_query";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionParams {
    pub filter: FilterMap,
    pub search: Option<String>,
    pub sort: Option<SortRequest>,
    pub range: Option<RangeRequest>,
}

impl CollectionParams {
    /// Decode the raw query-string values. Empty strings count as absent.
    pub fn decode(filter: Option<&str>, sort: Option<&str>, range: Option<&str>) -> Result<Self> {
        let filter = non_empty(filter)
            .map(|s| {
                serde_json::from_str::<JsonValue>(s)
                    .map_err(|e| QueryError::MalformedFilter(format!("Invalid JSON: {e}")))
            })
            .transpose()?;
        let sort = non_empty(sort)
            .map(|s| {
                serde_json::from_str::<JsonValue>(s)
                    .map_err(|e| QueryError::MalformedSort(format!("Invalid JSON: {e}")))
            })
            .transpose()?;
        let range = non_empty(range)
            .map(|s| {
                serde_json::from_str::<JsonValue>(s)
                    .map_err(|e| QueryError::MalformedRange(format!("Invalid JSON: {e}")))
            })
            .transpose()?;
        Self::from_values(filter, sort, range)
    }

    pub fn from_values(
        filter: Option<JsonValue>,
        sort: Option<JsonValue>,
        range: Option<JsonValue>,
    ) -> Result<Self> {
        let mut params = Self::default();
        if let Some(f) = filter {
            let JsonValue::Object(mut map) = f else {
                return Err(QueryError::MalformedFilter(
                    "filter must be a JSON object".into(),
                ));
            };
            match map.remove(SEARCH_KEY) {
                Some(JsonValue::String(term)) => params.search = Some(term),
                Some(JsonValue::Null) | None => {}
                Some(other) => {
                    debug!(value = %other, "non-string search term ignored");
                }
            }
            params.filter = map;
        }
        if let Some(s) = sort {
            params.sort = Some(decode_sort(s)?);
        }
        if let Some(r) = range {
            params.range = Some(decode_range(r)?);
        }
        Ok(params)
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

fn decode_sort(v: JsonValue) -> Result<SortRequest> {
    match v {
        JsonValue::Array(items) if items.len() == 2 => match (&items[0], &items[1]) {
            (JsonValue::String(field), JsonValue::String(dir)) => {
                Ok(SortRequest::new(field.clone(), dir.clone()))
            }
            _ => Err(QueryError::MalformedSort(
                "sort must be [field_name, \"ASC\"|\"DESC\"]".into(),
            )),
        },
        _ => Err(QueryError::MalformedSort(
            "sort must be a 2-element array".into(),
        )),
    }
}

fn decode_range(v: JsonValue) -> Result<RangeRequest> {
    match v {
        JsonValue::Array(items) if items.len() == 2 => {
            match (items[0].as_i64(), items[1].as_i64()) {
                (Some(start), Some(end)) => RangeRequest::new(start, end),
                _ => Err(QueryError::MalformedRange(
                    "range bounds must be integers".into(),
                )),
            }
        }
        _ => Err(QueryError::MalformedRange(
            "range must be a 2-element array [start, end]".into(),
        )),
    }
}

//! Raw filter keys: `field`, `field:op`, `a|b`, `a|b:op`.

use crate::schema::{FieldKind, SchemaDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

/// Decoded `filter` object, in the order the client wrote it.
pub type FilterMap = serde_json::Map<String, JsonValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
}

impl Operator {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "in" => Self::In,
            "not_in" | "nin" => Self::NotIn,
            _ => return None,
        })
    }
}

/// A filter value: arrays mean set membership, anything else is a scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Scalar(JsonValue),
    List(Vec<JsonValue>),
}

impl From<JsonValue> for FilterValue {
    fn from(v: JsonValue) -> Self {
        match v {
            JsonValue::Array(items) => Self::List(items),
            other => Self::Scalar(other),
        }
    }
}

/// Syntactic split of a raw key, before any schema lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKey<'k> {
    pub paths: Vec<&'k str>,
    pub operator: Option<Operator>,
}

/// Split `raw` into field path names and an optional operator. Returns
/// `None` for keys that cannot be parsed at all (empty, or more than one `:`).
/// An unrecognised operator token is dropped, never an error.
pub fn split_key(raw: &str) -> Option<RawKey<'_>> {
    let mut parts = raw.split(':');
    let path = parts.next().filter(|p| !p.is_empty())?;
    let token = parts.next();
    if parts.next().is_some() {
        return None;
    }
    let operator = token.and_then(|t| {
        let op = Operator::from_token(t);
        if op.is_none() {
            debug!(key = raw, token = t, "unknown filter operator, using default");
        }
        op
    });
    let paths = path.split('|').filter(|p| !p.is_empty()).collect();
    Some(RawKey { paths, operator })
}

/// One compiled-ready filter entry: an OR group of known fields, an optional
/// operator and the client's value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub fields: Vec<(String, FieldKind)>,
    pub operator: Option<Operator>,
    pub value: FilterValue,
}

impl FilterClause {
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }
}

/// Resolves raw keys against one entity's schema.
pub struct FilterKeyParser<'a> {
    schema: &'a SchemaDescriptor,
}

impl<'a> FilterKeyParser<'a> {
    pub fn new(schema: &'a SchemaDescriptor) -> Self {
        Self { schema }
    }

    /// Parse `raw` and keep only fields the schema knows. `None` means the
    /// whole clause is discarded.
    pub fn parse(&self, raw: &str) -> Option<(Vec<(String, FieldKind)>, Option<Operator>)> {
        let Some(key) = split_key(raw) else {
            debug!(key = raw, "unparsable filter key, clause discarded");
            return None;
        };
        let mut fields = Vec::with_capacity(key.paths.len());
        for name in key.paths {
            match self.schema.kind_of(name) {
                Some(kind) => {
                    if !fields.iter().any(|(n, _): &(String, FieldKind)| n == name) {
                        fields.push((name.to_string(), kind));
                    }
                }
                None => debug!(key = raw, field = name, "unknown filter field dropped"),
            }
        }
        if fields.is_empty() {
            debug!(key = raw, "no known fields left, clause discarded");
            return None;
        }
        Some((fields, key.operator))
    }

    /// Turn a decoded filter object into clauses, silently skipping every
    /// key that does not resolve and every `null` value.
    pub fn clauses(&self, filter: &FilterMap) -> Vec<FilterClause> {
        filter
            .iter()
            .filter_map(|(raw, value)| {
                if value.is_null() {
                    debug!(key = raw.as_str(), "null filter value, clause discarded");
                    return None;
                }
                let (fields, operator) = self.parse(raw)?;
                Some(FilterClause {
                    fields,
                    operator,
                    value: FilterValue::from(value.clone()),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntityConfig;
    use serde_json::json;

    fn schema() -> SchemaDescriptor {
        EntityConfig::builder("orders")
            .field("id", FieldKind::Text)
            .field("reference", FieldKind::Text)
            .field("pallets", FieldKind::Numeric)
            .build()
            .unwrap()
            .schema
    }

    #[test]
    fn splits_path_and_operator() {
        let k = split_key("pallets:gte").unwrap();
        assert_eq!(k.paths, vec!["pallets"]);
        assert_eq!(k.operator, Some(Operator::Gte));

        let k = split_key("id|reference").unwrap();
        assert_eq!(k.paths, vec!["id", "reference"]);
        assert_eq!(k.operator, None);
    }

    #[test]
    fn unknown_operator_token_is_absent() {
        let k = split_key("pallets:between").unwrap();
        assert_eq!(k.operator, None);
        assert_eq!(split_key("pallets:").unwrap().operator, None);
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(split_key("").is_none());
        assert!(split_key(":gte").is_none());
        assert!(split_key("a:gt:lt").is_none());
    }

    #[test]
    fn unknown_fields_drop_out_of_or_group() {
        let s = schema();
        let p = FilterKeyParser::new(&s);
        let (fields, _) = p.parse("nope|reference").unwrap();
        assert_eq!(fields, vec![("reference".to_string(), FieldKind::Text)]);
        assert!(p.parse("nope|other").is_none());
    }

    #[test]
    fn clauses_skip_nulls_and_unknowns() {
        let s = schema();
        let p = FilterKeyParser::new(&s);
        let filter = json!({
            "reference": "TEST",
            "ghost": 1,
            "pallets:gte": 5,
            "id": null,
            "id|reference": ["a", "b"],
        });
        let clauses = p.clauses(filter.as_object().unwrap());
        assert_eq!(clauses.len(), 3);
        assert_eq!(clauses[0].value, FilterValue::Scalar(json!("TEST")));
        assert_eq!(clauses[1].operator, Some(Operator::Gte));
        assert_eq!(
            clauses[2].value,
            FilterValue::List(vec![json!("a"), json!("b")])
        );
        assert_eq!(
            clauses[2].field_names().collect::<Vec<_>>(),
            vec!["id", "reference"]
        );
    }
}

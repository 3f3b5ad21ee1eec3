use crate::eval::{matches, order_rows};
use crate::traits::{Executor, Row};
use freightdesk_core::{CompiledQuery, CountQuery, Predicate, QueryError, Result};
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Rows per entity, kept in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryExecutor {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Row>>,
}

impl InMemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `row` under `entity`. Rows must be JSON objects; a missing `id`
    /// is filled with a fresh UUID.
    pub fn insert(&self, entity: &str, row: JsonValue) -> Result<Row> {
        let JsonValue::Object(mut row) = row else {
            return Err(QueryError::InvalidRow(format!(
                "{entity}: rows must be JSON objects"
            )));
        };
        if row.get("id").map_or(true, JsonValue::is_null) {
            row.insert("id".into(), JsonValue::String(Uuid::new_v4().to_string()));
        }
        self.inner
            .write()
            .tables
            .entry(entity.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    /// Load `{ "<entity>": [rows...] }`, returning how many rows were stored.
    pub fn load_seed(&self, seed: JsonValue) -> Result<usize> {
        let JsonValue::Object(tables) = seed else {
            return Err(QueryError::InvalidRow(
                "seed must map entity names to arrays of rows".into(),
            ));
        };
        let mut loaded = 0;
        for (entity, rows) in tables {
            let JsonValue::Array(rows) = rows else {
                return Err(QueryError::InvalidRow(format!(
                    "{entity}: seed rows must be an array"
                )));
            };
            for row in rows {
                self.insert(&entity, row)?;
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    pub fn len(&self, entity: &str) -> usize {
        self.inner.read().tables.get(entity).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, entity: &str) -> bool {
        self.len(entity) == 0
    }

    fn filtered(&self, entity: &str, predicate: Option<&Predicate>) -> Vec<Row> {
        let inner = self.inner.read();
        let Some(rows) = inner.tables.get(entity) else {
            debug!(entity, "no rows stored for entity");
            return Vec::new();
        };
        rows.iter()
            .filter(|r| predicate.map_or(true, |p| matches(p, r)))
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl Executor for InMemoryExecutor {
    async fn fetch(&self, query: &CompiledQuery) -> Result<Vec<Row>> {
        let mut rows = self.filtered(&query.entity, query.predicate.as_ref());
        if let Some(order) = &query.order_by {
            order_rows(&mut rows, order);
        }
        let offset = query.offset.unwrap_or(0) as usize;
        let out = rows.into_iter().skip(offset);
        Ok(match query.limit {
            Some(limit) => out.take(limit as usize).collect(),
            None => out.collect(),
        })
    }

    async fn count(&self, query: &CountQuery) -> Result<u64> {
        let inner = self.inner.read();
        let n = inner.tables.get(&query.entity).map_or(0, |rows| {
            rows.iter()
                .filter(|r| query.predicate.as_ref().map_or(true, |p| matches(p, r)))
                .count()
        });
        Ok(n as u64)
    }
}

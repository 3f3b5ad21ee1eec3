//! Per-entity field descriptors, built once at registration time and shared
//! read-only by every compilation afterwards.

use crate::errors::{QueryError, Result};
use crate::sort::OrderBy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Coarse comparison semantics of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Numeric,
    Temporal,
    Boolean,
    Enumerated,
}

impl FieldKind {
    /// Kinds compared with equality/range operators. Everything else is
    /// matched by substring.
    pub fn is_comparable(self) -> bool {
        matches!(self, Self::Numeric | Self::Temporal | Self::Boolean)
    }

    pub fn is_textual(self) -> bool {
        !self.is_comparable()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDescriptor {
    fields: BTreeMap<String, FieldKind>,
}

impl SchemaDescriptor {
    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        self.fields.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Everything the engine needs to know about one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityConfig {
    pub name: String,
    pub schema: SchemaDescriptor,
    pub sortable: BTreeSet<String>,
    pub default_order: Option<OrderBy>,
}

impl EntityConfig {
    pub fn builder(name: impl Into<String>) -> EntityConfigBuilder {
        EntityConfigBuilder {
            name: name.into(),
            fields: Vec::new(),
            sortable: Vec::new(),
            default_order: None,
        }
    }
}

pub struct EntityConfigBuilder {
    name: String,
    fields: Vec<(String, FieldKind)>,
    sortable: Vec<String>,
    default_order: Option<OrderBy>,
}

impl EntityConfigBuilder {
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push((name.into(), kind));
        self
    }

    pub fn fields<I, S>(mut self, kind: FieldKind, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .extend(names.into_iter().map(|n| (n.into(), kind)));
        self
    }

    pub fn sortable<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sortable.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn default_order(mut self, order: OrderBy) -> Self {
        self.default_order = Some(order);
        self
    }

    pub fn build(self) -> Result<EntityConfig> {
        if self.name.is_empty() {
            return Err(QueryError::Registration("entity name is empty".into()));
        }
        let mut fields = BTreeMap::new();
        for (name, kind) in self.fields {
            if name.is_empty() || name.contains(|c: char| c == '|' || c == ':') {
                return Err(QueryError::Registration(format!(
                    "{}: invalid field name '{}'",
                    self.name, name
                )));
            }
            if fields.insert(name.clone(), kind).is_some() {
                return Err(QueryError::Registration(format!(
                    "{}: field '{}' registered twice",
                    self.name, name
                )));
            }
        }
        Ok(EntityConfig {
            name: self.name,
            schema: SchemaDescriptor { fields },
            sortable: self.sortable.into_iter().collect(),
            default_order: self.default_order,
        })
    }
}

/// Immutable name -> config lookup handed to request handlers.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<String, Arc<EntityConfig>>,
}

impl EntityRegistry {
    pub fn new(configs: impl IntoIterator<Item = EntityConfig>) -> Result<Self> {
        let mut entities = BTreeMap::new();
        for cfg in configs {
            let name = cfg.name.clone();
            if entities.insert(name.clone(), Arc::new(cfg)).is_some() {
                return Err(QueryError::Registration(format!(
                    "entity '{name}' registered twice"
                )));
            }
        }
        Ok(Self { entities })
    }

    pub fn get(&self, name: &str) -> Result<Arc<EntityConfig>> {
        self.entities
            .get(name)
            .cloned()
            .ok_or_else(|| QueryError::UnknownEntity(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityConfig> {
        self.entities.values().map(|c| c.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_fields_and_whitelist() {
        let cfg = EntityConfig::builder("orders")
            .field("reference", FieldKind::Text)
            .fields(FieldKind::Numeric, ["pallets", "boxes"])
            .sortable(["reference"])
            .build()
            .unwrap();
        assert_eq!(cfg.schema.kind_of("pallets"), Some(FieldKind::Numeric));
        assert_eq!(cfg.schema.kind_of("missing"), None);
        assert_eq!(cfg.schema.len(), 3);
        assert!(cfg.sortable.contains("reference"));
    }

    #[test]
    fn duplicate_and_reserved_field_names_are_rejected() {
        let dup = EntityConfig::builder("x")
            .field("a", FieldKind::Text)
            .field("a", FieldKind::Numeric)
            .build();
        assert!(matches!(dup, Err(QueryError::Registration(_))));

        let piped = EntityConfig::builder("x").field("a|b", FieldKind::Text).build();
        assert!(matches!(piped, Err(QueryError::Registration(_))));
    }

    #[test]
    fn registry_rejects_duplicates_and_reports_unknown() {
        let a = EntityConfig::builder("a").build().unwrap();
        let reg = EntityRegistry::new([a.clone()]).unwrap();
        assert!(reg.get("a").is_ok());
        assert_eq!(
            reg.get("b").unwrap_err(),
            QueryError::UnknownEntity("b".into())
        );
        assert!(EntityRegistry::new([a.clone(), a]).is_err());
    }

    #[test]
    fn enumerated_counts_as_text() {
        assert!(FieldKind::Enumerated.is_textual());
        assert!(FieldKind::Boolean.is_comparable());
    }
}

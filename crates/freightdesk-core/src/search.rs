//! Free-text `_query` term layered onto the fields the caller already named.

use crate::predicate::Predicate;
use crate::schema::SchemaDescriptor;
use std::collections::BTreeSet;

pub struct GlobalSearchComposer;

impl GlobalSearchComposer {
    /// OR of substring matches over the explicitly filtered fields that are
    /// text-like. Numeric, temporal and boolean fields never take part.
    pub fn build(
        term: &str,
        schema: &SchemaDescriptor,
        explicit_fields: &BTreeSet<String>,
    ) -> Option<Predicate> {
        if term.is_empty() {
            return None;
        }
        let leaves: Vec<Predicate> = explicit_fields
            .iter()
            .filter(|f| schema.kind_of(f).is_some_and(|k| k.is_textual()))
            .map(|f| Predicate::Contains {
                field: f.clone(),
                needle: term.to_string(),
            })
            .collect();
        Predicate::any(leaves)
    }
}

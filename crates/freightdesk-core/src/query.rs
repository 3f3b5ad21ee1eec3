//! Orchestrates filter, search, sort and range into a data query and a count
//! query for one entity.

use crate::errors::Result;
use crate::filter::{FilterKeyParser, FilterMap};
use crate::predicate::{Predicate, PredicateBuilder};
use crate::range::RangeTranslator;
use crate::schema::EntityConfig;
use crate::search::GlobalSearchComposer;
use crate::sort::{OrderBy, SortResolver};
use crate::wire::CollectionParams;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Data query description. Owns no connection; executors run it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub entity: String,
    pub predicate: Option<Predicate>,
    pub order_by: Option<OrderBy>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// Count query: same predicate as the data query, never ordered or paged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountQuery {
    pub entity: String,
    pub predicate: Option<Predicate>,
}

pub struct QueryAssembler<'a> {
    entity: &'a EntityConfig,
    explicit_order: Option<OrderBy>,
    fallback_order: Option<OrderBy>,
    scope: Option<Predicate>,
    today: NaiveDate,
}

impl<'a> QueryAssembler<'a> {
    pub fn new(entity: &'a EntityConfig) -> Self {
        Self {
            entity,
            explicit_order: None,
            fallback_order: entity.default_order.clone(),
            scope: None,
            today: Utc::now().date_naive(),
        }
    }

    /// Ordering that wins over whatever the client asked for.
    pub fn with_order(mut self, order: OrderBy) -> Self {
        self.explicit_order = Some(order);
        self
    }

    /// Ordering used when neither an explicit nor a requested one applies.
    pub fn with_fallback_order(mut self, order: OrderBy) -> Self {
        self.fallback_order = Some(order);
        self
    }

    /// Base restriction applied to both queries ahead of the client filter.
    pub fn with_scope(mut self, scope: Predicate) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Reference date for relative date presets.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// AND of every clause predicate, then of the global search term.
    pub fn filter_predicate(&self, filter: &FilterMap, search: Option<&str>) -> Option<Predicate> {
        let schema = &self.entity.schema;
        let clauses = FilterKeyParser::new(schema).clauses(filter);
        let builder = PredicateBuilder::new(self.today);

        let named: BTreeSet<String> = clauses
            .iter()
            .flat_map(|c| c.field_names().map(str::to_string))
            .collect();
        let mut parts: Vec<Predicate> = clauses.iter().filter_map(|c| builder.clause(c)).collect();
        if let Some(term) = search {
            parts.extend(GlobalSearchComposer::build(term, schema, &named));
        }
        Predicate::all(parts)
    }

    pub fn assemble(&self, params: &CollectionParams) -> Result<(CompiledQuery, CountQuery)> {
        let filter = self.filter_predicate(&params.filter, params.search.as_deref());
        let predicate = Predicate::all(self.scope.clone().into_iter().chain(filter));

        let requested = SortResolver::new(&self.entity.sortable).resolve(params.sort.as_ref())?;
        let order_by = self
            .explicit_order
            .clone()
            .or(requested)
            .or_else(|| self.fallback_order.clone());

        let page = RangeTranslator::translate(params.range.as_ref());

        let data = CompiledQuery {
            entity: self.entity.name.clone(),
            predicate: predicate.clone(),
            order_by,
            offset: page.map(|p| p.offset),
            limit: page.map(|p| p.limit),
        };
        let count = CountQuery {
            entity: self.entity.name.clone(),
            predicate,
        };
        Ok((data, count))
    }
}

pub mod catalog;
pub mod dates;
pub mod errors;
pub mod filter;
pub mod predicate;
pub mod query;
pub mod range;
pub mod schema;
pub mod search;
pub mod sort;
pub mod wire;

pub use errors::*;
pub use filter::{FilterClause, FilterKeyParser, FilterMap, FilterValue, Operator};
pub use predicate::{Comparison, Predicate, PredicateBuilder};
pub use query::{CompiledQuery, CountQuery, QueryAssembler};
pub use range::{ContentRange, Pagination, RangeRequest, RangeTranslator};
pub use schema::{EntityConfig, EntityRegistry, FieldKind, SchemaDescriptor};
pub use search::GlobalSearchComposer;
pub use sort::{OrderBy, SortDirection, SortRequest, SortResolver};
pub use wire::{CollectionParams, SEARCH_KEY};

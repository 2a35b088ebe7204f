//! Faceted search engine - query construction and paginated execution / Фасетный поиск
//!
//! Architecture principles / Принципы:
//! - Catalogs describe themselves with a static [`CatalogSchema`]
//! - Untrusted input is normalized into a [`SearchRequest`]
//! - [`build_plan`] turns both into a data + count statement pair
//! - [`execute`] runs the pair against an explicitly passed pool
//!
//! Call direction: catalog adapter → search (unidirectional) / Направление вызовов

pub mod error;
pub mod facets;
pub mod pagination;
pub mod query;
pub mod sanitize;
pub mod sort;

pub use error::SearchError;
pub use facets::FacetAllowList;
pub use pagination::{execute, total_pages, Pagination, SearchResult};
pub use query::{
    build_plan, CatalogSchema, FieldColumn, Paging, PlanParam, Predicate, QueryPlan, SearchRequest,
    TermRouting, TextIndex,
};
pub use sanitize::{contains_cyrillic, quote_phrase};
pub use sort::{ColumnAllowList, NamedSort, SortDirection, SortSpec};

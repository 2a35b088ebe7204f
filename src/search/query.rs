//! Query builder - one parameterized builder for every catalog / Построитель запросов
//!
//! A [`CatalogSchema`] describes table and column names, a [`SearchRequest`]
//! carries the (untrusted) values. [`build_plan`] produces a [`QueryPlan`]:
//! a data statement, a count statement with the same FROM/WHERE, and the
//! positional parameters. Identifiers only ever come from the schema; values
//! are always bound, never interpolated.

use std::collections::{BTreeMap, BTreeSet};

use super::error::SearchError;
use super::sanitize::{contains_cyrillic, quote_phrase};
use super::sort::SortSpec;

/// Bound parameter value / Значение параметра
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanParam {
    Int(i64),
    Text(String),
}

impl From<i64> for PlanParam {
    fn from(v: i64) -> Self {
        PlanParam::Int(v)
    }
}

impl From<String> for PlanParam {
    fn from(v: String) -> Self {
        PlanParam::Text(v)
    }
}

impl From<&str> for PlanParam {
    fn from(v: &str) -> Self {
        PlanParam::Text(v.to_string())
    }
}

/// Where the FTS5 index of a catalog lives / Где находится индекс FTS5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextIndex {
    /// No full-text index, equality predicates only
    None,
    /// The table itself is an FTS5 virtual table
    Inline,
    /// A separate FTS5 table joined on a shared key column
    External { name: &'static str, key: &'static str },
}

/// How the primary term is matched / Как сопоставляется основной запрос
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermRouting {
    /// Match the phrase against the whole index
    Whole,
    /// Cyrillic terms hit the Cyrillic column only, everything else hits both
    Bilingual {
        latin: &'static str,
        cyrillic: &'static str,
    },
}

/// Filter key to FTS column mapping / Соответствие ключа фильтра колонке
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldColumn {
    pub key: &'static str,
    pub column: &'static str,
}

/// Per-catalog metadata / Метаданные каталога
#[derive(Debug, Clone, Copy)]
pub struct CatalogSchema {
    pub table: &'static str,
    pub alias: Option<&'static str>,
    /// SELECT list of the data statement
    pub columns: &'static [&'static str],
    /// Columns allowed in ORDER BY
    pub sortable: &'static [&'static str],
    pub index: TextIndex,
    pub routing: TermRouting,
    /// Optional per-field filters, emitted in this order
    pub fields: &'static [FieldColumn],
    pub facet_column: Option<&'static str>,
}

impl CatalogSchema {
    fn qualify(&self, column: &str) -> String {
        match self.alias {
            Some(alias) => format!("{}.{}", alias, column),
            None => column.to_string(),
        }
    }

    /// Left-hand side of a whole-index MATCH
    fn match_target(&self) -> Result<&'static str, SearchError> {
        match self.index {
            TextIndex::None => Err(SearchError::NoTextIndex(self.table)),
            TextIndex::Inline => Ok(self.table),
            TextIndex::External { name, .. } => Ok(name),
        }
    }

    /// Left-hand side of a single-column MATCH
    fn match_column(&self, column: &str) -> Result<String, SearchError> {
        match self.index {
            TextIndex::None => Err(SearchError::NoTextIndex(self.table)),
            TextIndex::Inline => Ok(column.to_string()),
            TextIndex::External { name, .. } => Ok(format!("{}.{}", name, column)),
        }
    }

    fn from_clause(&self, with_index: bool) -> String {
        let base = match self.alias {
            Some(alias) => format!("{} {}", self.table, alias),
            None => self.table.to_string(),
        };
        match self.index {
            TextIndex::External { name, key } if with_index => format!(
                "{} JOIN {} ON {}.{} = {}",
                base,
                name,
                name,
                key,
                self.qualify(key)
            ),
            _ => base,
        }
    }
}

/// Plain (non full-text) predicate / Обычное условие
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq(&'static str, PlanParam),
    Ne(&'static str, PlanParam),
    In(&'static str, Vec<PlanParam>),
}

/// Requested page window / Окно страницы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    /// 1-based page number and page size
    Page { page: i64, page_size: i64 },
    /// Datatables-style row offset and length
    Offset { start: i64, length: i64 },
}

impl Default for Paging {
    fn default() -> Self {
        Paging::Page { page: 1, page_size: 10 }
    }
}

impl Paging {
    pub fn page(page: i64, page_size: i64) -> Self {
        Paging::Page { page, page_size }
    }

    pub fn offset(start: i64, length: i64) -> Self {
        Paging::Offset { start, length }
    }

    /// LIMIT, never below 1
    pub fn limit(&self) -> i64 {
        match *self {
            Paging::Page { page_size, .. } => page_size.max(1),
            Paging::Offset { length, .. } => length.max(1),
        }
    }

    /// OFFSET = (page - 1) * page_size
    pub fn offset_rows(&self) -> i64 {
        match *self {
            Paging::Page { page, .. } => (page.max(1) - 1).saturating_mul(self.limit()),
            Paging::Offset { start, .. } => start.max(0),
        }
    }

    pub fn page_number(&self) -> i64 {
        match *self {
            Paging::Page { page, .. } => page.max(1),
            Paging::Offset { start, .. } => start.max(0) / self.limit() + 1,
        }
    }
}

/// Normalized search input / Нормализованный поисковый запрос
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Primary term; `None` means no term clause at all
    pub term: Option<String>,
    /// Per-field filter values keyed by [`FieldColumn::key`]
    pub filters: BTreeMap<String, String>,
    /// Facet tokens, already intersected with the allow-list
    pub facets: BTreeSet<String>,
    pub predicates: Vec<Predicate>,
    pub sort: Option<SortSpec>,
    pub paging: Paging,
}

impl SearchRequest {
    pub fn new(paging: Paging) -> Self {
        Self {
            paging,
            ..Default::default()
        }
    }

    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn facets(mut self, facets: BTreeSet<String>) -> Self {
        self.facets = facets;
        self
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }
}

/// Data + count statement pair / Пара запросов: данные и количество
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub data_sql: String,
    pub count_sql: String,
    /// Parameters shared by both statements
    pub params: Vec<PlanParam>,
    pub limit: i64,
    pub offset: i64,
    pub page: i64,
    pub uses_text_index: bool,
}

impl QueryPlan {
    /// Parameters of the data statement: shared ones, then LIMIT and OFFSET
    pub fn data_params(&self) -> Vec<PlanParam> {
        let mut params = self.params.clone();
        params.push(PlanParam::Int(self.limit));
        params.push(PlanParam::Int(self.offset));
        params
    }
}

/// Build the statement pair for a request / Построить пару запросов
pub fn build_plan(schema: &CatalogSchema, request: &SearchRequest) -> Result<QueryPlan, SearchError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<PlanParam> = Vec::new();

    // Primary term
    if let Some(term) = &request.term {
        let target = schema.match_target()?;
        let phrase = quote_phrase(term);
        match schema.routing {
            TermRouting::Bilingual { cyrillic, .. } if contains_cyrillic(term) => {
                conditions.push(format!("{} MATCH ?", schema.match_column(cyrillic)?));
                params.push(PlanParam::Text(phrase));
            }
            TermRouting::Bilingual { latin, cyrillic } => {
                conditions.push(format!("{} MATCH ?", target));
                params.push(PlanParam::Text(format!("{}:{} OR {}:{}", latin, phrase, cyrillic, phrase)));
            }
            TermRouting::Whole => {
                conditions.push(format!("{} MATCH ?", target));
                params.push(PlanParam::Text(phrase));
            }
        }
    }

    // Positional field filters, schema order
    for field in schema.fields {
        let Some(value) = request.filters.get(field.key).filter(|v| !v.is_empty()) else {
            continue;
        };
        conditions.push(format!("{} MATCH ?", schema.match_column(field.column)?));
        params.push(PlanParam::Text(quote_phrase(value)));
    }

    // Facets: OR inside, AND with the rest
    if !request.facets.is_empty() {
        let column = schema.facet_column.ok_or(SearchError::NoFacetColumn(schema.table))?;
        let target = schema.match_target()?;
        let expr = request
            .facets
            .iter()
            .map(|value| format!("{}:^{}", column, value))
            .collect::<Vec<_>>()
            .join(" OR ");
        conditions.push(format!("{} MATCH ?", target));
        params.push(PlanParam::Text(expr));
    }

    let uses_text_index = !conditions.is_empty();

    for predicate in &request.predicates {
        match predicate {
            Predicate::Eq(column, value) => {
                conditions.push(format!("{} = ?", schema.qualify(column)));
                params.push(value.clone());
            }
            Predicate::Ne(column, value) => {
                conditions.push(format!("{} != ?", schema.qualify(column)));
                params.push(value.clone());
            }
            Predicate::In(column, values) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                conditions.push(format!("{} IN ({})", schema.qualify(column), placeholders));
                params.extend(values.iter().cloned());
            }
        }
    }

    let order_clause = match request.sort {
        Some(sort) => {
            if !schema.sortable.contains(&sort.column) {
                return Err(SearchError::UnsortableColumn {
                    table: schema.table,
                    column: sort.column,
                });
            }
            format!(" ORDER BY {} {}", schema.qualify(sort.column), sort.direction.as_sql())
        }
        None => String::new(),
    };

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    let from_where = format!("FROM {}{}", schema.from_clause(uses_text_index), where_clause);

    let select_list = schema
        .columns
        .iter()
        .map(|c| schema.qualify(c))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(QueryPlan {
        data_sql: format!("SELECT {} {}{} LIMIT ? OFFSET ?", select_list, from_where, order_clause),
        count_sql: format!("SELECT COUNT(*) AS count {}", from_where),
        params,
        limit: request.paging.limit(),
        offset: request.paging.offset_rows(),
        page: request.paging.page_number(),
        uses_text_index,
    })
}

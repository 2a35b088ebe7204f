//! Pagination executor - runs a [`QueryPlan`] against SQLite / Исполнитель пагинации
//!
//! The data statement and the count statement are independent reads, so they
//! run concurrently. Either failing fails the whole request; no partial result
//! is ever returned.

use std::time::Instant;

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};

use super::error::SearchError;
use super::query::{PlanParam, QueryPlan};

/// One page of rows plus totals / Страница результатов
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<T> {
    pub rows: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Uniform pagination block / Блок пагинации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> SearchResult<T> {
    pub fn new(rows: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total = total.max(0);
        Self {
            rows,
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
        }
    }

    /// Post-process rows, keeping the totals / Преобразовать строки
    pub fn map<U, F>(self, f: F) -> SearchResult<U>
    where
        F: FnMut(T) -> U,
    {
        SearchResult {
            rows: self.rows.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            page_size: self.page_size,
            total_items: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// ceil(total / page_size), 0 for an empty result
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    let page_size = page_size.max(1);
    (total + page_size - 1) / page_size
}

/// Run both statements of a plan / Выполнить оба запроса плана
pub async fn execute<T>(pool: &SqlitePool, plan: &QueryPlan) -> Result<SearchResult<T>, SearchError>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let (rows, total) = tokio::try_join!(fetch_rows::<T>(pool, plan), fetch_count(pool, plan))?;
    Ok(SearchResult::new(rows, total, plan.page, plan.limit))
}

async fn fetch_rows<T>(pool: &SqlitePool, plan: &QueryPlan) -> Result<Vec<T>, SearchError>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let started = Instant::now();
    let mut query = sqlx::query_as::<_, T>(&plan.data_sql);
    for param in &plan.params {
        query = match param {
            PlanParam::Int(v) => query.bind(*v),
            PlanParam::Text(v) => query.bind(v.as_str()),
        };
    }
    let rows = query.bind(plan.limit).bind(plan.offset).fetch_all(pool).await?;
    tracing::debug!(
        "Fetching data: {} rows in {:.3}s",
        rows.len(),
        started.elapsed().as_secs_f64()
    );
    Ok(rows)
}

async fn fetch_count(pool: &SqlitePool, plan: &QueryPlan) -> Result<i64, SearchError> {
    let started = Instant::now();
    let mut query = sqlx::query_scalar::<_, i64>(&plan.count_sql);
    for param in &plan.params {
        query = match param {
            PlanParam::Int(v) => query.bind(*v),
            PlanParam::Text(v) => query.bind(v.as_str()),
        };
    }
    // Missing count row means an empty store
    let total = query.fetch_optional(pool).await?.unwrap_or(0);
    tracing::debug!(
        "Fetching total records: {} in {:.3}s",
        total,
        started.elapsed().as_secs_f64()
    );
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::query::{build_plan, CatalogSchema, Paging, SearchRequest, TextIndex, TermRouting};
    use proptest::prelude::*;
    use sqlx::sqlite::SqlitePoolOptions;

    const NUMBERS: CatalogSchema = CatalogSchema {
        table: "numbers",
        alias: None,
        columns: &["n"],
        sortable: &["n"],
        index: TextIndex::None,
        routing: TermRouting::Whole,
        fields: &[],
        facet_column: None,
    };

    #[derive(Debug, sqlx::FromRow)]
    struct Number {
        n: i64,
    }

    async fn numbers_pool(count: i64) -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE numbers (n INTEGER NOT NULL)")
            .execute(&pool)
            .await
            .unwrap();
        for n in 1..=count {
            sqlx::query("INSERT INTO numbers (n) VALUES (?)")
                .bind(n)
                .execute(&pool)
                .await
                .unwrap();
        }
        pool
    }

    #[tokio::test]
    async fn test_last_partial_page() {
        let pool = numbers_pool(40).await;
        let req = SearchRequest::new(Paging::page(3, 15)).sort(Some(crate::search::SortSpec::asc("n")));
        let plan = build_plan(&NUMBERS, &req).unwrap();
        let result: SearchResult<Number> = execute(&pool, &plan).await.unwrap();

        assert_eq!(result.rows.len(), 10);
        assert_eq!(result.rows.first().map(|r| r.n), Some(31));
        assert_eq!(result.rows.last().map(|r| r.n), Some(40));
        assert_eq!(result.total, 40);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.pagination().page_size, 15);
    }

    #[tokio::test]
    async fn test_empty_store_is_not_an_error() {
        let pool = numbers_pool(0).await;
        let plan = build_plan(&NUMBERS, &SearchRequest::new(Paging::default())).unwrap();
        let result: SearchResult<Number> = execute(&pool, &plan).await.unwrap();
        assert!(result.rows.is_empty());
        assert_eq!((result.total, result.total_pages), (0, 0));
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let pool = numbers_pool(0).await;
        let mut plan = build_plan(&NUMBERS, &SearchRequest::new(Paging::default())).unwrap();
        plan.count_sql = "SELECT COUNT(*) FROM missing_table".to_string();
        let result = execute::<Number>(&pool, &plan).await;
        assert!(matches!(result, Err(SearchError::Storage(_))));
    }

    #[test]
    fn test_map_keeps_totals() {
        let result = SearchResult::new(vec![1, 2], 12, 2, 5).map(|n| n * 10);
        assert_eq!(result.rows, vec![10, 20]);
        assert_eq!((result.total, result.total_pages), (12, 3));
    }

    proptest! {
        #[test]
        fn prop_total_pages(total in 0i64..100_000, page_size in 1i64..1_000) {
            let pages = total_pages(total, page_size);
            if total == 0 {
                prop_assert_eq!(pages, 0);
            } else {
                prop_assert!(pages * page_size >= total);
                prop_assert!((pages - 1) * page_size < total);
            }
        }
    }
}

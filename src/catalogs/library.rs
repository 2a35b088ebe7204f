//! Library catalog / Библиотека книг
//!
//! Plain tables without a full-text index: `books`, `categories`, `patches`.
//! Listings go through the search engine with equality predicates; details
//! are point reads with the related record attached afterwards.

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use super::row_to_json;
use crate::search::{
    build_plan, execute, CatalogSchema, Paging, PlanParam, Predicate, SearchError, SearchRequest,
    SearchResult, SortSpec, TermRouting, TextIndex,
};

/// Books of this category never appear in the general listing
pub const HIDDEN_CATEGORY: i64 = 2000;

pub const BOOKS: CatalogSchema = CatalogSchema {
    table: "books",
    alias: None,
    columns: &["id", "titleEn", "titleRu", "icon", "slug"],
    sortable: &["orderId", "titleRu"],
    index: TextIndex::None,
    routing: TermRouting::Whole,
    fields: &[],
    facet_column: None,
};

const BY_ORDER: SortSpec = SortSpec::asc("orderId");
const BY_TITLE: SortSpec = SortSpec::asc("titleRu");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: i64,
    pub title_en: Option<String>,
    pub title_ru: Option<String>,
    pub icon: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: i64,
    pub title_en: Option<String>,
    pub title_ru: Option<String>,
    pub icon: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct PatchSummary {
    pub version: String,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub slug: Option<String>,
}

/// Library pagination block / Пагинация библиотеки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookPagination {
    pub page: i64,
    pub page_size: i64,
    pub total_books: i64,
    pub total_pages: i64,
}

impl<T> From<&SearchResult<T>> for BookPagination {
    fn from(result: &SearchResult<T>) -> Self {
        Self {
            page: result.page,
            page_size: result.page_size,
            total_books: result.total,
            total_pages: result.total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookList {
    pub books: Vec<BookSummary>,
    pub pagination: BookPagination,
}

impl From<SearchResult<BookSummary>> for BookList {
    fn from(result: SearchResult<BookSummary>) -> Self {
        let pagination = BookPagination::from(&result);
        Self {
            books: result.rows,
            pagination,
        }
    }
}

async fn page_books(pool: &SqlitePool, request: SearchRequest) -> Result<BookList, SearchError> {
    let plan = build_plan(&BOOKS, &request)?;
    Ok(execute::<BookSummary>(pool, &plan).await?.into())
}

/// Attach a page of books to a detail record / Добавить страницу книг к записи
fn with_books(mut record: Map<String, Value>, list: BookList) -> Map<String, Value> {
    record.insert("books".to_string(), to_json(&list.books));
    record.insert("pagination".to_string(), to_json(&list.pagination));
    record
}

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// List all visible books / Список книг
pub async fn list_books(pool: &SqlitePool, paging: Paging) -> Result<BookList, SearchError> {
    let request = SearchRequest::new(paging)
        .predicate(Predicate::Ne("catId", PlanParam::Int(HIDDEN_CATEGORY)))
        .sort(Some(BY_ORDER));
    page_books(pool, request).await
}

/// Longest id list served by [`books_with_ids`], extra ids are ignored
pub const MAX_BOOK_IDS: usize = 1000;

/// Books by id list, unpaginated / Книги по списку идентификаторов
pub async fn books_with_ids(pool: &SqlitePool, ids: &[i64]) -> Result<Vec<BookSummary>, SearchError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    if ids.len() > MAX_BOOK_IDS {
        tracing::warn!("Truncating book id list from {} to {}", ids.len(), MAX_BOOK_IDS);
    }
    let ids = &ids[..ids.len().min(MAX_BOOK_IDS)];
    let len = i64::try_from(ids.len()).unwrap_or(i64::MAX);
    let request = SearchRequest::new(Paging::page(1, len))
        .predicate(Predicate::In("id", ids.iter().copied().map(PlanParam::Int).collect()))
        .sort(Some(BY_ORDER));
    Ok(page_books(pool, request).await?.books)
}

/// Book detail with its category / Книга с категорией
///
/// Returns `None` for an unknown id. A dangling category renders as `{}`.
pub async fn get_book(pool: &SqlitePool, id: i64) -> Result<Option<Map<String, Value>>, SearchError> {
    let Some(row) = sqlx::query("SELECT * FROM books WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };
    let mut book = row_to_json(&row);

    let category = match book.get("catId").and_then(Value::as_i64) {
        Some(cat_id) => {
            sqlx::query_as::<_, CategorySummary>(
                "SELECT id, titleEn, titleRu, icon, slug FROM categories WHERE id = ?",
            )
            .bind(cat_id)
            .fetch_optional(pool)
            .await?
        }
        None => None,
    };
    let category = category
        .map(|c| to_json(&c))
        .unwrap_or_else(|| Value::Object(Map::new()));
    book.insert("category".to_string(), category);
    Ok(Some(book))
}

/// All categories by Russian title / Все категории
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<CategorySummary>, SearchError> {
    let categories = sqlx::query_as::<_, CategorySummary>(
        "SELECT id, titleEn, titleRu, icon, slug FROM categories ORDER BY titleRu ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

/// Category with a page of its books / Категория с книгами
pub async fn get_category(
    pool: &SqlitePool,
    id: i64,
    paging: Paging,
) -> Result<Option<Map<String, Value>>, SearchError> {
    let Some(row) = sqlx::query("SELECT * FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    let request = SearchRequest::new(paging)
        .predicate(Predicate::Eq("catId", PlanParam::Int(id)))
        .sort(Some(BY_TITLE));
    let books = page_books(pool, request).await?;
    Ok(Some(with_books(row_to_json(&row), books)))
}

/// All patches, newest first / Все патчи
pub async fn list_patches(pool: &SqlitePool) -> Result<Vec<PatchSummary>, SearchError> {
    let patches = sqlx::query_as::<_, PatchSummary>(
        "SELECT version, nameEn, nameRu, slug FROM patches ORDER BY id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(patches)
}

/// Patch with a page of the books it added / Патч с книгами
pub async fn get_patch(
    pool: &SqlitePool,
    version: &str,
    paging: Paging,
) -> Result<Option<Map<String, Value>>, SearchError> {
    let Some(row) = sqlx::query("SELECT * FROM patches WHERE version = ?")
        .bind(version)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    let request = SearchRequest::new(paging)
        .predicate(Predicate::Eq("created", PlanParam::from(version)))
        .sort(Some(BY_ORDER));
    let books = page_books(pool, request).await?;
    Ok(Some(with_books(row_to_json(&row), books)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogs::fixtures::{exec_all, memory_pool};

    async fn library_pool() -> SqlitePool {
        let pool = memory_pool().await;
        let mut statements = vec![
            "CREATE TABLE books (id INTEGER PRIMARY KEY, catId INTEGER, titleEn TEXT, titleRu TEXT, \
             icon TEXT, slug TEXT, orderId INTEGER, created TEXT, text TEXT)"
                .to_string(),
            "CREATE TABLE categories (id INTEGER PRIMARY KEY, titleEn TEXT, titleRu TEXT, icon TEXT, \
             slug TEXT, description TEXT)"
                .to_string(),
            "CREATE TABLE patches (id INTEGER PRIMARY KEY, version TEXT, nameEn TEXT, nameRu TEXT, slug TEXT)"
                .to_string(),
            "INSERT INTO categories VALUES (1, 'Fiction', 'Художественные', 'f.png', 'fiction', 'd1')".to_string(),
            "INSERT INTO categories VALUES (2, 'Letters', 'Письма', 'l.png', 'letters', 'd2')".to_string(),
            "INSERT INTO categories VALUES (2000, 'Hidden', 'Скрытые', NULL, 'hidden', NULL)".to_string(),
            "INSERT INTO patches VALUES (1, '1.0', 'Launch', 'Запуск', 'launch')".to_string(),
            "INSERT INTO patches VALUES (2, '1.1', 'Update', 'Обновление', 'update')".to_string(),
        ];
        // 12 fiction books, 3 letters, 2 hidden, one with a dangling category
        for id in 1..=12 {
            statements.push(format!(
                "INSERT INTO books VALUES ({id}, 1, 'Book {id}', 'Книга {:02}', 'b.png', 'book-{id}', {}, '1.0', 'text')",
                13 - id,
                100 - id
            ));
        }
        for id in 13..=15 {
            statements.push(format!(
                "INSERT INTO books VALUES ({id}, 2, 'Letter {id}', 'Письмо {id}', NULL, 'letter-{id}', {id}, '1.1', NULL)"
            ));
        }
        for id in 16..=17 {
            statements.push(format!(
                "INSERT INTO books VALUES ({id}, 2000, 'Hidden {id}', 'Скрытая {id}', NULL, NULL, {id}, '1.1', NULL)"
            ));
        }
        statements.push(
            "INSERT INTO books VALUES (18, 77, 'Orphan', 'Сирота', NULL, NULL, 1, '1.1', NULL)".to_string(),
        );
        let refs: Vec<&str> = statements.iter().map(String::as_str).collect();
        exec_all(&pool, &refs).await;
        pool
    }

    #[tokio::test]
    async fn test_list_books_skips_hidden_category() {
        let pool = library_pool().await;
        let list = list_books(&pool, Paging::page(1, 10)).await.unwrap();
        assert_eq!(list.pagination.total_books, 16);
        assert_eq!(list.pagination.total_pages, 2);
        assert_eq!(list.books.len(), 10);
        assert!(list.books.iter().all(|b| !b.title_en.as_deref().unwrap_or("").starts_with("Hidden")));
        // orderId 1 belongs to the orphan
        assert_eq!(list.books[0].id, 18);

        let last = list_books(&pool, Paging::page(2, 10)).await.unwrap();
        assert_eq!(last.books.len(), 6);
    }

    #[tokio::test]
    async fn test_books_with_ids() {
        let pool = library_pool().await;
        let books = books_with_ids(&pool, &[3, 13, 999]).await.unwrap();
        let ids: Vec<i64> = books.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![13, 3]);
        assert!(books_with_ids(&pool, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_books_with_ids_caps_long_lists() {
        let pool = library_pool().await;
        let mut ids: Vec<i64> = (100_000..140_000).collect();
        ids.push(3);
        assert!(books_with_ids(&pool, &ids).await.unwrap().is_empty());

        ids.insert(0, 3);
        let books = books_with_ids(&pool, &ids).await.unwrap();
        assert_eq!(books.iter().map(|b| b.id).collect::<Vec<_>>(), vec![3]);
    }

    #[tokio::test]
    async fn test_get_book_attaches_category() {
        let pool = library_pool().await;
        let book = get_book(&pool, 13).await.unwrap().unwrap();
        assert_eq!(book["titleEn"], "Letter 13");
        assert_eq!(book["icon"], Value::Null);
        assert_eq!(book["category"]["titleRu"], "Письма");

        let orphan = get_book(&pool, 18).await.unwrap().unwrap();
        assert_eq!(orphan["category"], Value::Object(Map::new()));

        assert!(get_book(&pool, 404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_category_books_are_counted_by_category() {
        let pool = library_pool().await;
        let category = get_category(&pool, 1, Paging::page(2, 5)).await.unwrap().unwrap();
        assert_eq!(category["slug"], "fiction");
        assert_eq!(category["description"], "d1");
        assert_eq!(
            category["pagination"],
            serde_json::json!({"page": 2, "page_size": 5, "total_books": 12, "total_pages": 3})
        );
        let titles: Vec<&str> = category["books"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["titleRu"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Книга 06", "Книга 07", "Книга 08", "Книга 09", "Книга 10"]);

        assert!(get_category(&pool, 99, Paging::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_categories_and_patches_listing() {
        let pool = library_pool().await;
        let categories = list_categories(&pool).await.unwrap();
        let titles: Vec<&str> = categories.iter().filter_map(|c| c.title_ru.as_deref()).collect();
        assert_eq!(titles, vec!["Письма", "Скрытые", "Художественные"]);

        let patches = list_patches(&pool).await.unwrap();
        assert_eq!(patches[0].version, "1.1");
        assert_eq!(patches.len(), 2);
    }

    #[tokio::test]
    async fn test_get_patch() {
        let pool = library_pool().await;
        let patch = get_patch(&pool, "1.1", Paging::default()).await.unwrap().unwrap();
        assert_eq!(patch["nameEn"], "Update");
        assert_eq!(patch["pagination"]["total_books"], 6);
        assert_eq!(patch["books"][0]["id"], 18);

        assert!(get_patch(&pool, "9.9", Paging::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_table_is_storage_error() {
        let pool = memory_pool().await;
        let result = list_books(&pool, Paging::default()).await;
        assert!(matches!(result, Err(SearchError::Storage(_))));
    }
}

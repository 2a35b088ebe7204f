//! Catalog adapters / Адаптеры каталогов
//!
//! Each adapter supplies a static schema for the search engine and
//! post-processes the rows of the fetched page. Related records (categories,
//! patches) are attached with point reads after pagination, never joined into
//! the main query.

pub mod atx;
pub mod glossary;
pub mod library;

use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row};

/// Convert a `SELECT *` row into a JSON object / Строка в JSON-объект
///
/// Used where the full record is passed through as-is.
pub fn row_to_json(row: &SqliteRow) -> Map<String, Value> {
    let mut object = Map::new();
    for (i, column) in row.columns().iter().enumerate() {
        let value = if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
            v.map(Value::from).unwrap_or(Value::Null)
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(i) {
            v.map(Value::from).unwrap_or(Value::Null)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(i) {
            v.map(Value::from).unwrap_or(Value::Null)
        } else {
            Value::Null
        };
        object.insert(column.name().to_string(), value);
    }
    object
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_row_to_json() {
        let pool = fixtures::memory_pool().await;
        let row = sqlx::query("SELECT 7 AS id, 'Книга' AS titleRu, 1.5 AS weight, NULL AS icon")
            .fetch_one(&pool)
            .await
            .unwrap();
        let object = row_to_json(&row);
        assert_eq!(object["id"], Value::from(7));
        assert_eq!(object["titleRu"], Value::from("Книга"));
        assert_eq!(object["weight"], Value::from(1.5));
        assert_eq!(object["icon"], Value::Null);
    }
}

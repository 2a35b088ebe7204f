use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;

/// Busy timeout for catalog reads / Таймаут ожидания блокировки
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a catalog database read-only / Открыть базу каталога только для чтения
///
/// Connections are established lazily, so a missing file surfaces as a storage
/// error on the first request instead of aborting startup.
pub fn open_catalog(path: &Path, max_connections: u32) -> SqlitePool {
    if !path.exists() {
        tracing::warn!("Catalog database not found: {:?}", path);
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy_with(options);

    tracing::info!("Catalog database attached: {:?} (read-only)", path);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_catalog_is_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        let writable = SqlitePool::connect_with(
            SqliteConnectOptions::new().filename(&path).create_if_missing(true),
        )
        .await
        .unwrap();
        sqlx::query("CREATE TABLE books (id INTEGER)").execute(&writable).await.unwrap();
        sqlx::query("INSERT INTO books VALUES (1)").execute(&writable).await.unwrap();
        writable.close().await;

        let pool = open_catalog(&path, 1);
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert!(sqlx::query("INSERT INTO books VALUES (2)").execute(&pool).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_file_fails_on_use() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_catalog(&dir.path().join("missing.db"), 1);
        assert!(sqlx::query("SELECT 1").execute(&pool).await.is_err());
    }
}

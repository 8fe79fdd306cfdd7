//! Database and filesystem test utilities

use anyhow::Result;
use palette_crawler::db::SqlitePhotoStore;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Column information from PRAGMA table_info
#[derive(Debug, sqlx::FromRow)]
pub struct ColumnInfo {
    pub cid: i32,
    pub name: String,
    pub r#type: String,
    pub notnull: i32,
    pub dflt_value: Option<String>,
    pub pk: i32,
}

/// Create a temporary root folder with an initialized palette.db
///
/// Returns (TempDir, SqlitePool, store) - TempDir must be kept alive for duration of test
pub async fn create_test_store() -> Result<(TempDir, SqlitePool, Arc<SqlitePhotoStore>)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("palette.db");

    let pool = palette_common::db::init_database(&db_path).await?;
    let store = Arc::new(SqlitePhotoStore::new(pool.clone()));

    Ok((temp_dir, pool, store))
}

/// Get table schema information
pub async fn get_table_columns(pool: &SqlitePool, table_name: &str) -> Result<Vec<ColumnInfo>> {
    let query = format!("PRAGMA table_info({})", table_name);
    let columns = sqlx::query_as::<_, ColumnInfo>(&query)
        .fetch_all(pool)
        .await?;
    Ok(columns)
}

/// Count regular files below `dir`, recursively (0 if it does not exist)
pub fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

//! Database initialization
//!
//! Opens (creating if needed) the SQLite store and makes sure the
//! `palette` table exists. Any failure here is fatal for the crawler.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Name of the photo table
pub const PALETTE_TABLE: &str = "palette";

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_palette_table(&pool).await?;

    Ok(pool)
}

/// Create the photo table
///
/// `remote_url` is unique across every record ever stored; `color_mean`
/// is indexed because the admission histogram is seeded from it.
pub async fn create_palette_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS palette (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tags TEXT NOT NULL DEFAULT '',
            license INTEGER NOT NULL,
            user TEXT NOT NULL,
            user_fullname TEXT NOT NULL,
            date_taken TEXT NOT NULL,
            date_uploaded TEXT NOT NULL,
            width INTEGER NOT NULL,
            height INTEGER NOT NULL,
            remote_url TEXT NOT NULL UNIQUE,
            query_pool TEXT NOT NULL,
            color_mean INTEGER NOT NULL,
            color_stddev INTEGER NOT NULL,
            file_url TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_palette_color_mean ON palette(color_mean)")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_palette_table() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("palette.db")).await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
        )
        .bind(PALETTE_TABLE)
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("palette.db");

        let pool = init_database(&db_path).await.unwrap();
        pool.close().await;

        let pool = init_database(&db_path).await.unwrap();
        create_palette_table(&pool).await.unwrap();
        assert!(db_path.exists());
    }
}

//! Photo record persistence
//!
//! `PhotoStore` over the shared `palette` table. Each insert runs in its
//! own implicit transaction, so a stored record is durable as soon as
//! `insert_photo` returns.

use crate::error::Result;
use crate::types::{PhotoRecord, PhotoStore, StoreSeed};
use sqlx::{Row, SqlitePool};

#[derive(Clone)]
pub struct SqlitePhotoStore {
    pool: SqlitePool,
}

impl SqlitePhotoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of stored records
    pub async fn count_photos(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM palette")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Load one record by remote URL
    pub async fn load_by_remote_url(&self, remote_url: &str) -> Result<Option<PhotoRecord>> {
        let row = sqlx::query(
            r#"
            SELECT tags, license, user, user_fullname, date_taken, date_uploaded,
                   width, height, remote_url, query_pool, color_mean, color_stddev, file_url
            FROM palette
            WHERE remote_url = ?
            "#,
        )
        .bind(remote_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| PhotoRecord {
            tags: row.get("tags"),
            license: row.get("license"),
            user: row.get("user"),
            user_fullname: row.get("user_fullname"),
            date_taken: row.get("date_taken"),
            date_uploaded: row.get("date_uploaded"),
            width: row.get::<i64, _>("width") as u32,
            height: row.get::<i64, _>("height") as u32,
            remote_url: row.get("remote_url"),
            query_pool: row.get("query_pool"),
            color_mean: row.get::<i64, _>("color_mean") as u32,
            color_stddev: row.get::<i64, _>("color_stddev") as u32,
            file_url: row.get("file_url"),
        }))
    }
}

#[async_trait::async_trait]
impl PhotoStore for SqlitePhotoStore {
    async fn insert_photo(&self, record: &PhotoRecord) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO palette (
                tags, license, user, user_fullname, date_taken, date_uploaded,
                width, height, remote_url, query_pool, color_mean, color_stddev, file_url
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.tags)
        .bind(record.license)
        .bind(&record.user)
        .bind(&record.user_fullname)
        .bind(&record.date_taken)
        .bind(&record.date_uploaded)
        .bind(record.width as i64)
        .bind(record.height as i64)
        .bind(&record.remote_url)
        .bind(&record.query_pool)
        .bind(record.color_mean as i64)
        .bind(record.color_stddev as i64)
        .bind(&record.file_url)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, remote_url = %record.remote_url, "Photo record stored");
        Ok(id)
    }

    async fn load_seeds(&self) -> Result<Vec<StoreSeed>> {
        let rows = sqlx::query("SELECT remote_url, color_mean FROM palette")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| StoreSeed {
                remote_url: row.get("remote_url"),
                color_mean: row.get::<i64, _>("color_mean") as u32,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrawlError;
    use tempfile::TempDir;

    async fn setup_store() -> (TempDir, SqlitePhotoStore) {
        let dir = TempDir::new().unwrap();
        let pool = palette_common::db::init_database(&dir.path().join("palette.db"))
            .await
            .unwrap();
        (dir, SqlitePhotoStore::new(pool))
    }

    fn record(remote_url: &str, color_mean: u32) -> PhotoRecord {
        PhotoRecord {
            tags: "cat,sky".to_string(),
            license: 4,
            user: "jdoe".to_string(),
            user_fullname: "Jane Doe".to_string(),
            date_taken: "2008-05-01 10:00:00".to_string(),
            date_uploaded: "2009-02-13 00:00:00".to_string(),
            width: 75,
            height: 75,
            remote_url: remote_url.to_string(),
            query_pool: "sunset".to_string(),
            color_mean,
            color_stddev: 12,
            file_url: "img/1/11/111/a.jpg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let (_dir, store) = setup_store().await;
        let original = record("https://example.com/a.jpg", 16711680);

        let id = store.insert_photo(&original).await.unwrap();
        assert!(id > 0);
        assert_eq!(store.count_photos().await.unwrap(), 1);

        let loaded = store
            .load_by_remote_url("https://example.com/a.jpg")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn test_duplicate_remote_url_rejected() {
        let (_dir, store) = setup_store().await;
        store.insert_photo(&record("https://example.com/a.jpg", 1)).await.unwrap();

        let result = store.insert_photo(&record("https://example.com/a.jpg", 2)).await;
        assert!(matches!(result, Err(CrawlError::Database(_))));
        assert_eq!(store.count_photos().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_seeds() {
        let (_dir, store) = setup_store().await;
        store.insert_photo(&record("https://example.com/a.jpg", 5)).await.unwrap();
        store.insert_photo(&record("https://example.com/b.jpg", 5)).await.unwrap();
        store.insert_photo(&record("https://example.com/c.jpg", 9)).await.unwrap();

        let mut seeds = store.load_seeds().await.unwrap();
        seeds.sort_by(|a, b| a.remote_url.cmp(&b.remote_url));

        assert_eq!(seeds.len(), 3);
        assert_eq!(seeds[0].remote_url, "https://example.com/a.jpg");
        assert_eq!(seeds[0].color_mean, 5);
        assert_eq!(seeds[2].color_mean, 9);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let (_dir, store) = setup_store().await;
        assert!(store.load_seeds().await.unwrap().is_empty());
        assert_eq!(store.count_photos().await.unwrap(), 0);
        assert!(store.load_by_remote_url("missing").await.unwrap().is_none());
    }
}

use crate::domain::history::{ConversionRecord, HistoryTotals, NewConversionRecord, VoiceCount};
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Storage of conversion records.
///
/// Every read and delete is scoped by `owner_key`; a record owned by another
/// key behaves exactly like a missing one.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Insert every record or none of them
    async fn insert_many(
        &self,
        records: Vec<NewConversionRecord>,
    ) -> AppResult<Vec<ConversionRecord>>;

    /// Newest first
    async fn find_by_owner(
        &self,
        owner_key: &str,
        voice: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ConversionRecord>>;

    async fn count_by_owner(&self, owner_key: &str, voice: Option<&str>) -> AppResult<i64>;

    async fn delete_one(&self, owner_key: &str, id: Uuid) -> AppResult<bool>;

    async fn delete_all(&self, owner_key: &str) -> AppResult<u64>;

    async fn totals(&self, owner_key: &str) -> AppResult<HistoryTotals>;

    /// Sorted by count, highest first
    async fn voice_counts(&self, owner_key: &str) -> AppResult<Vec<VoiceCount>>;
}

pub struct PgHistoryRepository {
    pool: Arc<DbPool>,
}

impl PgHistoryRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryRepository for PgHistoryRepository {
    async fn insert_many(
        &self,
        records: Vec<NewConversionRecord>,
    ) -> AppResult<Vec<ConversionRecord>> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(records.len());

        for record in records {
            let row = sqlx::query_as::<_, ConversionRecord>(
                r#"
                INSERT INTO audio_history (id, text, voice, audio_url, duration, owner_key, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, text, voice, audio_url, duration, owner_key, created_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&record.text)
            .bind(&record.voice)
            .bind(&record.audio_url)
            .bind(record.duration)
            .bind(&record.owner_key)
            .bind(chrono::Utc::now())
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row);
        }

        // dropping the transaction on an early return rolls it back
        tx.commit().await?;

        Ok(saved)
    }

    async fn find_by_owner(
        &self,
        owner_key: &str,
        voice: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<ConversionRecord>> {
        let pool = self.pool.as_ref();
        let records = sqlx::query_as::<_, ConversionRecord>(
            r#"
            SELECT id, text, voice, audio_url, duration, owner_key, created_at
            FROM audio_history
            WHERE owner_key = $1 AND ($2::TEXT IS NULL OR voice = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(owner_key)
        .bind(voice)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    async fn count_by_owner(&self, owner_key: &str, voice: Option<&str>) -> AppResult<i64> {
        let pool = self.pool.as_ref();
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM audio_history
            WHERE owner_key = $1 AND ($2::TEXT IS NULL OR voice = $2)
            "#,
        )
        .bind(owner_key)
        .bind(voice)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    async fn delete_one(&self, owner_key: &str, id: Uuid) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            DELETE FROM audio_history
            WHERE id = $1 AND owner_key = $2
            "#,
        )
        .bind(id)
        .bind(owner_key)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self, owner_key: &str) -> AppResult<u64> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            DELETE FROM audio_history
            WHERE owner_key = $1
            "#,
        )
        .bind(owner_key)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn totals(&self, owner_key: &str) -> AppResult<HistoryTotals> {
        let pool = self.pool.as_ref();
        let totals = sqlx::query_as::<_, HistoryTotals>(
            r#"
            SELECT
                COUNT(*) AS total_conversions,
                COALESCE(SUM(duration), 0)::BIGINT AS total_duration,
                COALESCE(AVG(duration), 0)::DOUBLE PRECISION AS average_duration
            FROM audio_history
            WHERE owner_key = $1
            "#,
        )
        .bind(owner_key)
        .fetch_one(pool)
        .await?;

        Ok(totals)
    }

    async fn voice_counts(&self, owner_key: &str) -> AppResult<Vec<VoiceCount>> {
        let pool = self.pool.as_ref();
        let counts = sqlx::query_as::<_, VoiceCount>(
            r#"
            SELECT voice, COUNT(*) AS count
            FROM audio_history
            WHERE owner_key = $1
            GROUP BY voice
            ORDER BY count DESC, voice ASC
            "#,
        )
        .bind(owner_key)
        .fetch_all(pool)
        .await?;

        Ok(counts)
    }
}

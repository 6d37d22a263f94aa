use crate::domain::entities::Story;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{format_timestamp, Database};
use sqlx::Row;

impl Database {
    // ========== Story Operations ==========

    /// Insert a story row (idempotent on id)
    pub async fn create_story(&self, id: i64) -> ApiResult<Story> {
        let now = format_timestamp(chrono::Utc::now());
        sqlx::query(
            "INSERT INTO stories (id, created_at, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get_story_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Story {} not found", id)))
    }

    /// Get story by ID
    pub async fn get_story_by_id(&self, id: i64) -> ApiResult<Option<Story>> {
        let row = sqlx::query(
            "SELECT id, created_at, updated_at
             FROM stories
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(Story {
                id: row.try_get("id")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Delete a story by ID; `false` when it was already gone
    pub async fn delete_story(&self, id: i64) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM stories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!("Story deleted: id={}", id);
        }
        Ok(deleted)
    }
}

// Repository trait implementation
#[async_trait::async_trait]
impl crate::domain::ports::story_repository::StoryRepository for Database {
    async fn create_story(&self, id: i64) -> ApiResult<Story> {
        self.create_story(id).await
    }

    async fn get_story_by_id(&self, id: i64) -> ApiResult<Option<Story>> {
        self.get_story_by_id(id).await
    }

    async fn delete_story(&self, id: i64) -> ApiResult<bool> {
        self.delete_story(id).await
    }
}

use crate::domain::entities::{is_valid_hashtag_name, Hashtag, PostHashtag, TaggingOutcome};
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::{format_timestamp, Database};
use sqlx::Row;

impl Database {
    // ========== Hashtag Operations ==========

    /// Link a post to a set of hashtag names in a single transaction.
    ///
    /// Per name: create the hashtag if absent, re-read its id, insert the link
    /// if absent, and bump `post_count` only when the link row was new. The
    /// unique constraints on `hashtags.name` and `(post_id, hashtag_id)` make
    /// concurrent callers race safely; the loser of either insert sees zero
    /// affected rows and skips the increment.
    pub async fn attach_hashtags(
        &self,
        post_id: i64,
        names: &[String],
    ) -> ApiResult<TaggingOutcome> {
        let mut outcome = TaggingOutcome::default();
        let valid: Vec<&String> = names
            .iter()
            .filter(|name| is_valid_hashtag_name(name))
            .collect();
        outcome.names_skipped = (names.len() - valid.len()) as u64;

        if valid.is_empty() {
            return Ok(outcome);
        }

        let mut tx = self.pool.begin().await?;

        for name in valid {
            let created = sqlx::query(
                "INSERT INTO hashtags (name, post_count)
                 VALUES (?, 0)
                 ON CONFLICT (name) DO NOTHING",
            )
            .bind(name.as_str())
            .execute(&mut *tx)
            .await?;
            outcome.hashtags_created += created.rows_affected();

            let row = sqlx::query("SELECT id FROM hashtags WHERE name = ?")
                .bind(name.as_str())
                .fetch_one(&mut *tx)
                .await?;
            let hashtag_id: i64 = row.try_get("id")?;

            let now = format_timestamp(chrono::Utc::now());
            let linked = sqlx::query(
                "INSERT INTO post_hashtags (post_id, hashtag_id, created_at)
                 VALUES (?, ?, ?)
                 ON CONFLICT (post_id, hashtag_id) DO NOTHING",
            )
            .bind(post_id)
            .bind(hashtag_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

            if linked.rows_affected() == 0 {
                outcome.links_existing += 1;
                tracing::debug!(
                    "Post {} already linked to hashtag '{}' (idempotent)",
                    post_id,
                    name
                );
                continue;
            }

            // Store-side increment; never read-modify-write the counter here
            sqlx::query("UPDATE hashtags SET post_count = post_count + 1 WHERE id = ?")
                .bind(hashtag_id)
                .execute(&mut *tx)
                .await?;
            outcome.links_created += 1;
        }

        tx.commit().await?;

        tracing::info!(
            post_id,
            links_created = outcome.links_created,
            links_existing = outcome.links_existing,
            hashtags_created = outcome.hashtags_created,
            "Hashtags attached to post"
        );
        Ok(outcome)
    }

    /// Get hashtag by name
    pub async fn get_hashtag_by_name(&self, name: &str) -> ApiResult<Option<Hashtag>> {
        let row = sqlx::query(
            "SELECT id, name, post_count
             FROM hashtags
             WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(Hashtag {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                post_count: row.try_get("post_count")?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Hashtags with the highest post counts
    pub async fn get_trending_hashtags(&self, limit: i64) -> ApiResult<Vec<Hashtag>> {
        let rows = sqlx::query(
            "SELECT id, name, post_count
             FROM hashtags
             ORDER BY post_count DESC, id ASC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut hashtags = Vec::with_capacity(rows.len());
        for row in rows {
            hashtags.push(Hashtag {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                post_count: row.try_get("post_count")?,
            });
        }

        Ok(hashtags)
    }

    /// One page of post ids for a hashtag, newest link first
    pub async fn get_post_ids_for_hashtag(
        &self,
        hashtag_id: i64,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<i64>> {
        let rows = sqlx::query(
            "SELECT post_id
             FROM post_hashtags
             WHERE hashtag_id = ?
             ORDER BY created_at DESC, post_id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(hashtag_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<i64, _>("post_id").map_err(Into::into))
            .collect()
    }

    /// All link rows for a post
    pub async fn get_post_hashtags(&self, post_id: i64) -> ApiResult<Vec<PostHashtag>> {
        let rows = sqlx::query(
            "SELECT post_id, hashtag_id, created_at
             FROM post_hashtags
             WHERE post_id = ?
             ORDER BY hashtag_id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        let mut links = Vec::with_capacity(rows.len());
        for row in rows {
            links.push(PostHashtag {
                post_id: row.try_get("post_id")?,
                hashtag_id: row.try_get("hashtag_id")?,
                created_at: row.try_get("created_at")?,
            });
        }

        Ok(links)
    }

    /// Hashtags whose stored `post_count` disagrees with their link rows.
    ///
    /// Returns `(hashtag, actual link count)` pairs; empty when consistent.
    pub async fn find_inconsistent_hashtags(&self) -> ApiResult<Vec<(Hashtag, i64)>> {
        let rows = sqlx::query(
            "SELECT h.id, h.name, h.post_count, COUNT(ph.post_id) AS link_count
             FROM hashtags h
             LEFT JOIN post_hashtags ph ON ph.hashtag_id = h.id
             GROUP BY h.id, h.name, h.post_count
             HAVING h.post_count <> COUNT(ph.post_id)",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut mismatched = Vec::with_capacity(rows.len());
        for row in rows {
            mismatched.push((
                Hashtag {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    post_count: row.try_get("post_count")?,
                },
                row.try_get("link_count")?,
            ));
        }

        if !mismatched.is_empty() {
            tracing::warn!("{} hashtags have a drifted post_count", mismatched.len());
        }
        Ok(mismatched)
    }
}

// Repository trait implementation
#[async_trait::async_trait]
impl crate::domain::ports::hashtag_repository::HashtagRepository for Database {
    async fn attach_hashtags(&self, post_id: i64, names: &[String]) -> ApiResult<TaggingOutcome> {
        self.attach_hashtags(post_id, names).await
    }

    async fn get_hashtag_by_name(&self, name: &str) -> ApiResult<Option<Hashtag>> {
        self.get_hashtag_by_name(name).await
    }

    async fn get_trending_hashtags(&self, limit: i64) -> ApiResult<Vec<Hashtag>> {
        self.get_trending_hashtags(limit).await
    }

    async fn get_post_ids_for_hashtag(
        &self,
        hashtag_id: i64,
        limit: i64,
        offset: i64,
    ) -> ApiResult<Vec<i64>> {
        self.get_post_ids_for_hashtag(hashtag_id, limit, offset).await
    }
}

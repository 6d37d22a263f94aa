use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entities::Delivery;
use crate::domain::ports::broker::Broker;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use crate::infrastructure::persistence::{format_timestamp, Database};

/// Durable broker backed by the `queues` / `queue_messages` tables.
///
/// A received message is leased: its `visible_at` moves to `now + lease`
/// and a fresh `lease_token` is written. Acking deletes the row only if the
/// token still matches; an unacked message becomes visible again once the
/// lease runs out.
#[derive(Clone)]
pub struct SqlBroker {
    db: Database,
    lease: Duration,
}

impl SqlBroker {
    pub fn new(db: Database, lease: Duration) -> Self {
        Self { db, lease }
    }

    /// Number of messages still stored for a queue, leased or not
    pub async fn depth(&self, queue: &str) -> ApiResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS depth FROM queue_messages WHERE queue = ?")
            .bind(queue)
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.try_get("depth")?)
    }

    async fn queue_exists(&self, queue: &str) -> ApiResult<bool> {
        let row = sqlx::query("SELECT name FROM queues WHERE name = ?")
            .bind(queue)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl Broker for SqlBroker {
    async fn declare_queue(&self, queue: &str) -> ApiResult<()> {
        let now = format_timestamp(Utc::now());
        let result = sqlx::query(
            "INSERT INTO queues (name, durable, created_at)
             VALUES (?, 1, ?)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(queue)
        .bind(&now)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() > 0 {
            tracing::info!(queue, "Declared durable queue");
        }
        Ok(())
    }

    async fn publish(&self, queue: &str, body: &[u8]) -> ApiResult<String> {
        if !self.queue_exists(queue).await? {
            return Err(ApiError::NotFound(format!("Queue {} not declared", queue)));
        }

        let id = Uuid::new_v4().to_string();
        let now = format_timestamp(Utc::now());

        sqlx::query(
            "INSERT INTO queue_messages (id, queue, body, enqueued_at, visible_at, delivery_count)
             VALUES (?, ?, ?, ?, ?, 0)",
        )
        .bind(&id)
        .bind(queue)
        .bind(body.to_vec())
        .bind(&now)
        .bind(&now)
        .execute(self.db.pool())
        .await?;

        tracing::debug!(queue, message_id = %id, "Published message");
        Ok(id)
    }

    async fn receive(&self, queue: &str) -> ApiResult<Option<Delivery>> {
        let now = Utc::now();
        let lease_until = chrono::Duration::from_std(self.lease)
            .ok()
            .and_then(|lease| now.checked_add_signed(lease))
            .ok_or_else(|| {
                tracing::error!(queue, lease = ?self.lease, "Broker lease out of range");
                ApiError::Internal("Lease duration out of range".to_string())
            })?;
        let now_str = format_timestamp(now);
        let lease_token = Uuid::new_v4().to_string();

        // Transaction to ensure atomic lease-and-fetch. The lease is the first
        // statement so SQLite takes the write lock up front instead of
        // upgrading from a read.
        let mut tx = self.db.pool().begin().await?;

        // 1. Lease the oldest visible message. Concurrent receivers racing
        // for the same row serialize on the write lock; the loser no longer
        // matches `visible_at <= now` and moves on to the next row.
        let result = sqlx::query(
            "UPDATE queue_messages
             SET visible_at = ?, lease_token = ?, delivery_count = delivery_count + 1
             WHERE id = (
                 SELECT id FROM queue_messages
                 WHERE queue = ? AND visible_at <= ?
                 ORDER BY seq ASC
                 LIMIT 1
             )",
        )
        .bind(format_timestamp(lease_until))
        .bind(&lease_token)
        .bind(queue)
        .bind(&now_str)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        // 2. Fetch full details
        let message_row = sqlx::query(
            "SELECT id, queue, body, delivery_count
             FROM queue_messages WHERE lease_token = ?",
        )
        .bind(&lease_token)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(Delivery {
            id: message_row.try_get("id")?,
            queue: message_row.try_get("queue")?,
            body: message_row.try_get("body")?,
            delivery_count: message_row.try_get::<i64, _>("delivery_count")? as i32,
            lease_token,
        }))
    }

    async fn ack(&self, delivery: &Delivery) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM queue_messages WHERE id = ? AND lease_token = ?")
            .bind(&delivery.id)
            .bind(&delivery.lease_token)
            .execute(self.db.pool())
            .await?;

        let acked = result.rows_affected() > 0;
        if !acked {
            tracing::warn!(
                queue = %delivery.queue,
                message_id = %delivery.id,
                "Ack ignored: lease expired or message already acknowledged"
            );
        }
        Ok(acked)
    }
}

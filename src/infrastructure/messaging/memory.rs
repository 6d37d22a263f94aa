use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entities::Delivery;
use crate::domain::ports::broker::Broker;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};

#[derive(Debug, Clone)]
struct StoredMessage {
    id: String,
    body: Vec<u8>,
    delivery_count: i32,
    visible_at: Instant,
    lease_token: Option<String>,
}

/// Process-local broker with the same lease semantics as [`super::SqlBroker`].
///
/// Nothing survives a restart, so it is only wired up in tests and local runs.
#[derive(Default)]
pub struct InMemoryBroker {
    queues: Mutex<HashMap<String, VecDeque<StoredMessage>>>,
    lease: Duration,
}

impl InMemoryBroker {
    pub fn new(lease: Duration) -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            lease,
        }
    }

    /// Messages still held for a queue, leased or not
    pub async fn depth(&self, queue: &str) -> usize {
        self.queues
            .lock()
            .await
            .get(queue)
            .map(VecDeque::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn declare_queue(&self, queue: &str) -> ApiResult<()> {
        self.queues
            .lock()
            .await
            .entry(queue.to_string())
            .or_default();
        Ok(())
    }

    async fn publish(&self, queue: &str, body: &[u8]) -> ApiResult<String> {
        let mut queues = self.queues.lock().await;
        let messages = queues
            .get_mut(queue)
            .ok_or_else(|| ApiError::NotFound(format!("Queue {} not declared", queue)))?;

        let id = Uuid::new_v4().to_string();
        messages.push_back(StoredMessage {
            id: id.clone(),
            body: body.to_vec(),
            delivery_count: 0,
            visible_at: Instant::now(),
            lease_token: None,
        });
        Ok(id)
    }

    async fn receive(&self, queue: &str) -> ApiResult<Option<Delivery>> {
        let mut queues = self.queues.lock().await;
        let Some(messages) = queues.get_mut(queue) else {
            return Ok(None);
        };

        let now = Instant::now();
        let Some(message) = messages.iter_mut().find(|m| m.visible_at <= now) else {
            return Ok(None);
        };

        let visible_at = now.checked_add(self.lease).ok_or_else(|| {
            tracing::error!(queue, lease = ?self.lease, "Broker lease out of range");
            ApiError::Internal("Lease duration out of range".to_string())
        })?;

        let lease_token = Uuid::new_v4().to_string();
        message.visible_at = visible_at;
        message.lease_token = Some(lease_token.clone());
        message.delivery_count += 1;

        Ok(Some(Delivery {
            id: message.id.clone(),
            queue: queue.to_string(),
            body: message.body.clone(),
            delivery_count: message.delivery_count,
            lease_token,
        }))
    }

    async fn ack(&self, delivery: &Delivery) -> ApiResult<bool> {
        let mut queues = self.queues.lock().await;
        let Some(messages) = queues.get_mut(&delivery.queue) else {
            return Ok(false);
        };

        let position = messages.iter().position(|m| {
            m.id == delivery.id && m.lease_token.as_deref() == Some(delivery.lease_token.as_str())
        });

        match position {
            Some(index) => {
                messages.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unacked_message_is_redelivered_after_lease() {
        let broker = InMemoryBroker::new(Duration::ZERO);
        broker.declare_queue("q").await.unwrap();
        broker.publish("q", b"{}").await.unwrap();

        let first = broker.receive("q").await.unwrap().unwrap();
        assert_eq!(first.delivery_count, 1);

        let second = broker.receive("q").await.unwrap().unwrap();
        assert_eq!(second.id, first.id);
        assert!(second.is_redelivery());

        // The stale lease can no longer ack
        assert!(!broker.ack(&first).await.unwrap());
        assert!(broker.ack(&second).await.unwrap());
        assert_eq!(broker.depth("q").await, 0);
    }

    #[tokio::test]
    async fn leased_message_is_hidden() {
        let broker = InMemoryBroker::new(Duration::from_secs(60));
        broker.declare_queue("q").await.unwrap();
        broker.publish("q", b"a").await.unwrap();
        broker.publish("q", b"b").await.unwrap();

        let a = broker.receive("q").await.unwrap().unwrap();
        let b = broker.receive("q").await.unwrap().unwrap();
        assert_eq!(a.body, b"a");
        assert_eq!(b.body, b"b");
        assert!(broker.receive("q").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_lease_is_an_error_not_a_panic() {
        let broker = InMemoryBroker::new(Duration::MAX);
        broker.declare_queue("q").await.unwrap();
        broker.publish("q", b"{}").await.unwrap();

        assert!(matches!(
            broker.receive("q").await,
            Err(ApiError::Internal(_))
        ));
        // The message was not leased
        assert_eq!(broker.depth("q").await, 1);
    }

    #[tokio::test]
    async fn publish_to_undeclared_queue_fails() {
        let broker = InMemoryBroker::new(Duration::ZERO);
        assert!(matches!(
            broker.publish("missing", b"{}").await,
            Err(ApiError::NotFound(_))
        ));
    }
}

use crate::domain::entities::Delivery;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

/// A message broker offering durable named queues with at-least-once
/// delivery and explicit acknowledgement.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Declare a durable queue. Declaring an existing queue is a no-op.
    async fn declare_queue(&self, queue: &str) -> ApiResult<()>;

    /// Append a message to a declared queue and return its message id.
    async fn publish(&self, queue: &str, body: &[u8]) -> ApiResult<String>;

    /// Take the oldest visible message, if any.
    ///
    /// The message stays invisible to other receivers until it is acked or
    /// its lease runs out, after which it is delivered again.
    async fn receive(&self, queue: &str) -> ApiResult<Option<Delivery>>;

    /// Acknowledge a delivery, removing the message for good.
    ///
    /// Returns `false` when the lease had already expired and the message was
    /// handed to someone else (or acked before).
    async fn ack(&self, delivery: &Delivery) -> ApiResult<bool>;
}

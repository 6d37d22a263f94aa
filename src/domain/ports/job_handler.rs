use crate::domain::entities::JobPayload;
use crate::domain::errors::HandlerError;
use async_trait::async_trait;

/// Applies one decoded job to the store.
///
/// Implementations must be idempotent: the broker delivers at least once, so
/// the same job may be handled again after a successful but unacknowledged run.
#[async_trait]
pub trait JobHandler: Send + Sync {
    type Job: JobPayload;

    async fn handle(&self, job: Self::Job) -> Result<(), HandlerError>;
}

use async_trait::async_trait;
use std::time::Duration;

/// Source of delays for startup retries and idle queue polling.
///
/// Tests substitute an implementation that returns immediately.
#[async_trait]
pub trait TimeService: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

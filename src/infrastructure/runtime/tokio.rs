use crate::domain::ports::time_service::TimeService;
use async_trait::async_trait;
use std::time::Duration;

/// Wall-clock delays on the tokio timer; wired in by `main`.
#[derive(Clone, Default)]
pub struct TokioTimeService;

impl TokioTimeService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TimeService for TokioTimeService {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sleep_waits_at_least_the_duration() {
        let start = tokio::time::Instant::now();
        TokioTimeService::new().sleep(Duration::from_millis(20)).await;
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}

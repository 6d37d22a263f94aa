use async_trait::async_trait;
use hoshi_pipeline::domain::entities::PostRecord;
use hoshi_pipeline::domain::ports::entity_validator::EntityValidator;
use hoshi_pipeline::domain::ports::post_directory::PostDirectory;
use hoshi_pipeline::domain::ports::time_service::TimeService;
use hoshi_pipeline::infrastructure::http::middleware::error::{ApiError, ApiResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Post service stand-in that returns a record for every requested id.
#[derive(Default)]
pub struct FakePostDirectory {
    pub missing: HashSet<i64>,
    pub fail: AtomicBool,
    pub delay: Option<Duration>,
    pub calls: Mutex<Vec<Vec<i64>>>,
}

impl FakePostDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let fake = Self::default();
        fake.fail.store(true, Ordering::SeqCst);
        fake
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PostDirectory for FakePostDirectory {
    async fn get_posts(&self, post_ids: &[i64]) -> ApiResult<Vec<PostRecord>> {
        self.calls.lock().unwrap().push(post_ids.to_vec());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Internal("post service unavailable".to_string()));
        }

        // Reverse to prove the caller restores page order
        let mut records: Vec<PostRecord> = post_ids
            .iter()
            .filter(|id| !self.missing.contains(id))
            .map(|id| {
                let mut record = PostRecord::new(*id);
                record
                    .fields
                    .insert("caption".to_string(), format!("post {}", id).into());
                record
            })
            .collect();
        records.reverse();
        Ok(records)
    }
}

/// Validator that knows a fixed set of post ids.
pub struct KnownPosts(pub HashSet<i64>);

#[async_trait]
impl EntityValidator for KnownPosts {
    async fn subject_exists(&self, subject_id: i64) -> ApiResult<bool> {
        Ok(self.0.contains(&subject_id))
    }
}

/// Sleeps are recorded and yield instead of waiting.
#[derive(Default)]
pub struct RecordingTimeService {
    pub sleeps: AtomicUsize,
}

#[async_trait]
impl TimeService for RecordingTimeService {
    async fn sleep(&self, _duration: Duration) {
        self.sleeps.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
    }
}

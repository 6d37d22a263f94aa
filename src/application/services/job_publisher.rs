use crate::{
    domain::entities::{HashtagJob, JobPayload, StoryDeletionJob},
    domain::ports::broker::Broker,
    infrastructure::http::middleware::error::ApiResult,
};
use std::sync::Arc;

/// Publishes jobs onto the worker queues
#[derive(Clone)]
pub struct JobPublisher {
    broker: Arc<dyn Broker>,
    story_deletion_queue: String,
    hashtag_queue: String,
}

impl JobPublisher {
    pub fn new(
        broker: Arc<dyn Broker>,
        story_deletion_queue: impl Into<String>,
        hashtag_queue: impl Into<String>,
    ) -> Self {
        Self {
            broker,
            story_deletion_queue: story_deletion_queue.into(),
            hashtag_queue: hashtag_queue.into(),
        }
    }

    pub async fn schedule_story_deletion(&self, story_id: i64) -> ApiResult<String> {
        let job = StoryDeletionJob { story_id };
        let message_id = self
            .broker
            .publish(&self.story_deletion_queue, &job.encode())
            .await?;
        tracing::info!("Queued story deletion for story {}", story_id);
        Ok(message_id)
    }

    pub async fn schedule_hashtags(
        &self,
        post_id: i64,
        hashtag_names: Vec<String>,
    ) -> ApiResult<String> {
        let job = HashtagJob {
            post_id,
            hashtag_names,
        };
        let message_id = self.broker.publish(&self.hashtag_queue, &job.encode()).await?;
        tracing::info!("Queued hashtag job for post {}", post_id);
        Ok(message_id)
    }
}

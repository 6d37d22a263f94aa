use crate::{
    domain::entities::StoryDeletionJob,
    domain::errors::HandlerError,
    domain::ports::job_handler::JobHandler,
    domain::ports::story_repository::StoryRepository,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Deletes expired stories.
///
/// A story that is already gone counts as success: the broker may redeliver a
/// job whose earlier run deleted the row but never got acknowledged.
#[derive(Clone)]
pub struct StoryDeletionHandler {
    story_repo: Arc<dyn StoryRepository>,
}

impl StoryDeletionHandler {
    pub fn new(story_repo: Arc<dyn StoryRepository>) -> Self {
        Self { story_repo }
    }
}

#[async_trait]
impl JobHandler for StoryDeletionHandler {
    type Job = StoryDeletionJob;

    async fn handle(&self, job: StoryDeletionJob) -> Result<(), HandlerError> {
        let deleted = self
            .story_repo
            .delete_story(job.story_id)
            .await
            .map_err(|e| {
                HandlerError::Transient(format!("Failed to delete story {}: {}", job.story_id, e))
            })?;

        if deleted {
            tracing::info!("Successfully deleted story {}", job.story_id);
        } else {
            tracing::info!("Story {} already deleted, nothing to do", job.story_id);
        }
        Ok(())
    }
}

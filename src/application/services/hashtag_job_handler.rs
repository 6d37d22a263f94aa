use crate::{
    application::services::HashtagService,
    domain::entities::HashtagJob,
    domain::errors::HandlerError,
    domain::ports::job_handler::JobHandler,
    infrastructure::http::middleware::error::ApiError,
};
use async_trait::async_trait;

/// Applies `hashtag_queue` jobs through the [`HashtagService`].
///
/// Safe to redeliver: a second run finds the links already present and
/// leaves every counter untouched.
#[derive(Clone)]
pub struct HashtagJobHandler {
    hashtag_service: HashtagService,
}

impl HashtagJobHandler {
    pub fn new(hashtag_service: HashtagService) -> Self {
        Self { hashtag_service }
    }
}

#[async_trait]
impl JobHandler for HashtagJobHandler {
    type Job = HashtagJob;

    async fn handle(&self, job: HashtagJob) -> Result<(), HandlerError> {
        tracing::info!("Processing hashtag job for Post ID: {}", job.post_id);

        match self
            .hashtag_service
            .add_hashtags_to_post(job.post_id, &job.hashtag_names)
            .await
        {
            Ok(_) => Ok(()),
            Err(ApiError::NotFound(msg)) | Err(ApiError::BadRequest(msg)) => {
                Err(HandlerError::Permanent(msg))
            }
            Err(ApiError::Internal(msg)) => Err(HandlerError::Transient(msg)),
        }
    }
}

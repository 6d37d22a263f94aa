use crate::{
    domain::entities::TaggingOutcome,
    domain::ports::entity_validator::EntityValidator,
    domain::ports::hashtag_repository::HashtagRepository,
    infrastructure::http::middleware::error::{ApiError, ApiResult},
};
use std::sync::Arc;

/// Service for linking posts to hashtags
#[derive(Clone)]
pub struct HashtagService {
    hashtag_repo: Arc<dyn HashtagRepository>,
    validator: Arc<dyn EntityValidator>,
}

impl HashtagService {
    pub fn new(
        hashtag_repo: Arc<dyn HashtagRepository>,
        validator: Arc<dyn EntityValidator>,
    ) -> Self {
        Self {
            hashtag_repo,
            validator,
        }
    }

    /// Add hashtags to a post.
    ///
    /// Names are stored exactly as received. Blank names are skipped, so an
    /// empty or all-blank list succeeds without touching the store. Re-tagging
    /// a post with a name it already carries is a no-op.
    pub async fn add_hashtags_to_post(
        &self,
        post_id: i64,
        hashtag_names: &[String],
    ) -> ApiResult<TaggingOutcome> {
        tracing::info!(
            "AddHashtagsToPost request for post {} with tags: {:?}",
            post_id,
            hashtag_names
        );

        if post_id <= 0 {
            return Err(ApiError::BadRequest(format!(
                "Invalid post id {}",
                post_id
            )));
        }

        // 1. Verify the post exists in the post service
        if !self.validator.subject_exists(post_id).await? {
            return Err(ApiError::NotFound(format!("Post {} not found", post_id)));
        }

        // 2. Create hashtags, links and counter increments in one transaction
        let outcome = self
            .hashtag_repo
            .attach_hashtags(post_id, hashtag_names)
            .await
            .map_err(|e| {
                tracing::error!("Failed to add hashtags to post {}: {}", post_id, e);
                match e {
                    ApiError::Internal(_) => {
                        ApiError::Internal("Failed to process hashtags".to_string())
                    }
                    other => other,
                }
            })?;

        if outcome.links_created > 0 {
            metrics::counter!("hashtag_links_created_total").increment(outcome.links_created);
        }

        Ok(outcome)
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::entities::PostRecord;
use crate::domain::ports::entity_validator::EntityValidator;
use crate::domain::ports::post_directory::PostDirectory;
use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};

#[derive(Debug, Serialize)]
struct GetPostsRequest<'a> {
    post_ids: &'a [i64],
}

#[derive(Debug, Deserialize)]
struct GetPostsResponse {
    #[serde(default)]
    posts: Vec<PostRecord>,
}

#[derive(Debug, Deserialize)]
struct PostExistsResponse {
    exists: bool,
}

/// HTTP client for the post service's internal endpoints.
#[derive(Clone)]
pub struct HttpPostService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPostService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PostDirectory for HttpPostService {
    async fn get_posts(&self, post_ids: &[i64]) -> ApiResult<Vec<PostRecord>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/internal/posts/batch", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&GetPostsRequest { post_ids })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Post service batch lookup returned HTTP {}", status);
            return Err(ApiError::Internal(
                "Failed to get posts from post service".to_string(),
            ));
        }

        let body: GetPostsResponse = response.json().await?;
        Ok(body.posts)
    }
}

#[async_trait]
impl EntityValidator for HttpPostService {
    async fn subject_exists(&self, subject_id: i64) -> ApiResult<bool> {
        let url = format!("{}/internal/posts/{}/exists", self.base_url, subject_id);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => {
                let body: PostExistsResponse = response.json().await?;
                Ok(body.exists)
            }
            status => {
                tracing::error!("Post service existence check returned HTTP {}", status);
                Err(ApiError::Internal(
                    "Failed to validate post with post service".to_string(),
                ))
            }
        }
    }
}

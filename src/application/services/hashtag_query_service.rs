use crate::{
    domain::entities::{Hashtag, HashtagSearchPage, PostRecord},
    domain::ports::hashtag_repository::HashtagRepository,
    domain::ports::post_directory::PostDirectory,
    infrastructure::http::middleware::error::{ApiError, ApiResult},
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const MAX_TRENDING_LIMIT: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Read-only queries over hashtag counters and links.
///
/// Every call is bounded by `request_timeout`, covering both the store reads
/// and the post service batch lookup.
#[derive(Clone)]
pub struct HashtagQueryService {
    hashtag_repo: Arc<dyn HashtagRepository>,
    post_directory: Arc<dyn PostDirectory>,
    request_timeout: Duration,
}

impl HashtagQueryService {
    pub fn new(
        hashtag_repo: Arc<dyn HashtagRepository>,
        post_directory: Arc<dyn PostDirectory>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            hashtag_repo,
            post_directory,
            request_timeout,
        }
    }

    /// Top `limit` hashtags by post count, highest first
    pub async fn get_trending_hashtags(&self, limit: i64) -> ApiResult<Vec<Hashtag>> {
        tracing::info!("GetTrendingHashtags request, limit {}", limit);

        if limit <= 0 || limit > MAX_TRENDING_LIMIT {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_TRENDING_LIMIT
            )));
        }

        self.with_deadline(self.hashtag_repo.get_trending_hashtags(limit))
            .await
            .map_err(|e| {
                tracing::error!("Failed to get trending hashtags: {}", e);
                internal_or(e, "Failed to retrieve trending hashtags")
            })
    }

    /// One page of posts tagged with `hashtag_name`, most recently tagged first.
    ///
    /// An unknown hashtag yields an empty page with a zero total. A known
    /// hashtag always reports its stored post count, even past the last page.
    pub async fn search_by_hashtag(
        &self,
        hashtag_name: &str,
        page_size: i64,
        page_offset: i64,
    ) -> ApiResult<HashtagSearchPage> {
        tracing::info!("SearchByHashtag request for tag: {}", hashtag_name);

        if page_size <= 0 || page_size > MAX_PAGE_SIZE {
            return Err(ApiError::BadRequest(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if page_offset < 0 {
            return Err(ApiError::BadRequest(
                "page_offset must not be negative".to_string(),
            ));
        }

        self.with_deadline(self.search_page(hashtag_name, page_size, page_offset))
            .await
    }

    async fn search_page(
        &self,
        hashtag_name: &str,
        page_size: i64,
        page_offset: i64,
    ) -> ApiResult<HashtagSearchPage> {
        // 1. Find the hashtag
        let Some(hashtag) = self.hashtag_repo.get_hashtag_by_name(hashtag_name).await? else {
            return Ok(HashtagSearchPage::default());
        };

        // 2. Find the post ids for this page
        let post_ids = self
            .hashtag_repo
            .get_post_ids_for_hashtag(hashtag.id, page_size, page_offset)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list posts for hashtag {}: {}", hashtag.id, e);
                internal_or(e, "Failed to retrieve post list for hashtag")
            })?;

        if post_ids.is_empty() {
            return Ok(HashtagSearchPage {
                posts: Vec::new(),
                total_post_count: hashtag.post_count,
            });
        }

        // 3. One batched call to the post service for the whole page
        let records = self.post_directory.get_posts(&post_ids).await.map_err(|e| {
            tracing::error!("Failed to get posts from post service: {}", e);
            ApiError::Internal("Failed to get posts from post service".to_string())
        })?;

        Ok(HashtagSearchPage {
            posts: order_like(&post_ids, records),
            total_post_count: hashtag.post_count,
        })
    }

    async fn with_deadline<T>(&self, fut: impl Future<Output = ApiResult<T>>) -> ApiResult<T> {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Hashtag query exceeded {:?}", self.request_timeout);
                Err(ApiError::Internal("Request deadline exceeded".to_string()))
            }
        }
    }
}

/// Arrange records in the order of `ids`, dropping ids the post service did not return.
fn order_like(ids: &[i64], records: Vec<PostRecord>) -> Vec<PostRecord> {
    let mut by_id: HashMap<i64, PostRecord> =
        records.into_iter().map(|record| (record.id, record)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

fn internal_or(err: ApiError, message: &str) -> ApiError {
    match err {
        ApiError::Internal(_) => ApiError::Internal(message.to_string()),
        other => other,
    }
}

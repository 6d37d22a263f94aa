use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    domain::entities::{Hashtag, PostRecord, TaggingOutcome},
    infrastructure::http::middleware::{ApiResult, AppState},
};

#[derive(Debug, Deserialize)]
pub struct AddHashtagsRequest {
    #[serde(default)]
    pub hashtag_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default = "default_limit")]
    pub page_size: i64,
    #[serde(default)]
    pub page_offset: i64,
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HashtagResponse {
    pub id: String,
    pub name: String,
    pub count: i64,
}

impl From<Hashtag> for HashtagResponse {
    fn from(hashtag: Hashtag) -> Self {
        Self {
            id: hashtag.id.to_string(),
            name: hashtag.name,
            count: hashtag.post_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrendingHashtagsResponse {
    pub hashtags: Vec<HashtagResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchByHashtagResponse {
    pub posts: Vec<PostRecord>,
    pub total_post_count: i64,
}

/// POST /api/posts/:id/hashtags - Link a post to hashtags
pub async fn add_hashtags_to_post(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AddHashtagsRequest>, JsonRejection>,
) -> ApiResult<Json<TaggingOutcome>> {
    let Path(post_id) = path?;
    let Json(req) = payload?;

    let outcome = state
        .hashtag_service
        .add_hashtags_to_post(post_id, &req.hashtag_names)
        .await?;

    Ok(Json(outcome))
}

/// GET /api/hashtags/trending?limit=N - Most used hashtags
pub async fn get_trending_hashtags(
    State(state): State<AppState>,
    query: Result<Query<TrendingQuery>, QueryRejection>,
) -> ApiResult<Json<TrendingHashtagsResponse>> {
    let Query(query) = query?;

    let hashtags = state
        .hashtag_query_service
        .get_trending_hashtags(query.limit)
        .await?;

    Ok(Json(TrendingHashtagsResponse {
        hashtags: hashtags.into_iter().map(HashtagResponse::from).collect(),
    }))
}

/// GET /api/hashtags/:name/posts - Posts tagged with a hashtag
pub async fn search_by_hashtag(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<SearchByHashtagResponse>> {
    let Path(hashtag_name) = path?;
    let Query(query) = query?;

    let page = state
        .hashtag_query_service
        .search_by_hashtag(&hashtag_name, query.page_size, query.page_offset)
        .await?;

    Ok(Json(SearchByHashtagResponse {
        posts: page.posts,
        total_post_count: page.total_post_count,
    }))
}

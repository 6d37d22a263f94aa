use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::infrastructure::http::middleware::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduledJobResponse {
    pub message_id: String,
}

/// POST /api/stories/:id/deletion - Queue a story for deletion
pub async fn schedule_story_deletion(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<(StatusCode, Json<ScheduledJobResponse>)> {
    let Path(story_id) = path?;
    if story_id <= 0 {
        return Err(ApiError::BadRequest(format!("Invalid story id {}", story_id)));
    }

    let message_id = state.job_publisher.schedule_story_deletion(story_id).await?;

    Ok((StatusCode::ACCEPTED, Json(ScheduledJobResponse { message_id })))
}

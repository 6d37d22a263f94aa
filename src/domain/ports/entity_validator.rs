use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

/// Checks that a subject owned by another service exists before it is
/// referenced locally.
#[async_trait]
pub trait EntityValidator: Send + Sync {
    async fn subject_exists(&self, subject_id: i64) -> ApiResult<bool>;
}

/// Validator that trusts every id. Used when the producer already
/// guarantees the subject exists.
#[derive(Clone, Default)]
pub struct AcceptAllValidator;

#[async_trait]
impl EntityValidator for AcceptAllValidator {
    async fn subject_exists(&self, _subject_id: i64) -> ApiResult<bool> {
        Ok(true)
    }
}

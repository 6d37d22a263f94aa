use crate::application::services::{HashtagQueryService, HashtagService, JobPublisher};

/// Shared state handed to every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub hashtag_service: HashtagService,
    pub hashtag_query_service: HashtagQueryService,
    pub job_publisher: JobPublisher,
}

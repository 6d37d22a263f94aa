pub mod hashtag_job_handler;
pub mod hashtag_query_service;
pub mod hashtag_service;
pub mod job_publisher;
pub mod story_deletion_handler;

pub use hashtag_job_handler::HashtagJobHandler;
pub use hashtag_query_service::HashtagQueryService;
pub use hashtag_service::HashtagService;
pub use job_publisher::JobPublisher;
pub use story_deletion_handler::StoryDeletionHandler;

pub mod broker;
pub mod entity_validator;
pub mod hashtag_repository;
pub mod job_handler;
pub mod post_directory;
pub mod story_repository;
pub mod time_service;

pub mod hashtags;
pub mod stories;

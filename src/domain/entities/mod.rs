pub mod delivery;
pub mod hashtag;
pub mod job;
pub mod story;

pub use delivery::*;
pub use hashtag::*;
pub use job::*;
pub use story::*;

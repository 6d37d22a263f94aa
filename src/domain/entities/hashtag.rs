use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A hashtag and the denormalized number of posts linked to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hashtag {
    pub id: i64,
    pub name: String,
    pub post_count: i64,
}

/// A post <-> hashtag link row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostHashtag {
    pub post_id: i64,
    pub hashtag_id: i64,
    pub created_at: String,
}

/// Result of one tagging call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaggingOutcome {
    /// Hashtag rows created by this call.
    pub hashtags_created: u64,
    /// Links created by this call; each one bumped a counter exactly once.
    pub links_created: u64,
    /// Names that were already linked to the post (or repeated in the call).
    pub links_existing: u64,
    /// Names rejected before reaching the store.
    pub names_skipped: u64,
}

/// A post record as returned by the post service batch lookup.
///
/// Only `id` is interpreted here; every other field is passed through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostRecord {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PostRecord {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            fields: Map::new(),
        }
    }
}

/// One page of a search-by-hashtag query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HashtagSearchPage {
    pub posts: Vec<PostRecord>,
    pub total_post_count: i64,
}

/// Names that can never be stored as a hashtag.
pub fn is_valid_hashtag_name(name: &str) -> bool {
    !name.trim().is_empty()
}

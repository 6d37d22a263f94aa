use serde::{Deserialize, Serialize};

/// A story row. The worker only cares about its identity; content lives in
/// the story service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Story {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::errors::JobDecodeError;

pub const STORY_DELETION_QUEUE: &str = "story_deletion_queue";
pub const HASHTAG_QUEUE: &str = "hashtag_queue";

/// A job body carried by the broker.
///
/// Bodies are flat JSON objects. Keys the job does not know about are
/// ignored; a missing or mistyped required key is a decode failure.
pub trait JobPayload: Sized + Send + Sync + 'static {
    /// Short name used in logs and metrics labels.
    const KIND: &'static str;

    fn decode(body: &[u8]) -> Result<Self, JobDecodeError>;

    fn encode(&self) -> Vec<u8>;
}

/// Deferred deletion of a story, published when the story expires.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryDeletionJob {
    pub story_id: i64,
}

impl JobPayload for StoryDeletionJob {
    const KIND: &'static str = "story_deletion";

    fn decode(body: &[u8]) -> Result<Self, JobDecodeError> {
        let object = parse_object(body)?;
        let story_id = required_id(&object, "story_id")?;
        Ok(Self { story_id })
    }

    fn encode(&self) -> Vec<u8> {
        serde_json::json!({ "story_id": self.story_id })
            .to_string()
            .into_bytes()
    }
}

/// Links a post to the hashtags found in its caption.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashtagJob {
    pub post_id: i64,
    pub hashtag_names: Vec<String>,
}

impl JobPayload for HashtagJob {
    const KIND: &'static str = "hashtag";

    fn decode(body: &[u8]) -> Result<Self, JobDecodeError> {
        let object = parse_object(body)?;
        let post_id = required_id(&object, "post_id")?;

        let hashtag_names = match object.get("hashtag_names") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_owned)
                        .ok_or_else(|| JobDecodeError::InvalidValue {
                            key: "hashtag_names",
                            reason: format!("expected a string, got {}", item),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(JobDecodeError::InvalidValue {
                    key: "hashtag_names",
                    reason: format!("expected an array, got {}", other),
                })
            }
        };

        Ok(Self {
            post_id,
            hashtag_names,
        })
    }

    fn encode(&self) -> Vec<u8> {
        serde_json::json!({
            "post_id": self.post_id,
            "hashtag_names": self.hashtag_names,
        })
        .to_string()
        .into_bytes()
    }
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, JobDecodeError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| JobDecodeError::Malformed(e.to_string()))?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(JobDecodeError::NotAnObject),
    }
}

/// Entity ids arrive either as JSON integers or as decimal strings.
fn required_id(object: &Map<String, Value>, key: &'static str) -> Result<i64, JobDecodeError> {
    let value = object.get(key).ok_or(JobDecodeError::MissingKey(key))?;

    let id = match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| JobDecodeError::InvalidValue {
            key,
            reason: format!("{} is not an integer", n),
        })?,
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| JobDecodeError::InvalidValue {
                key,
                reason: e.to_string(),
            })?,
        Value::Null => return Err(JobDecodeError::MissingKey(key)),
        other => {
            return Err(JobDecodeError::InvalidValue {
                key,
                reason: format!("unexpected value {}", other),
            })
        }
    };

    if id <= 0 {
        return Err(JobDecodeError::InvalidValue {
            key,
            reason: format!("{} is not a positive id", id),
        });
    }

    Ok(id)
}

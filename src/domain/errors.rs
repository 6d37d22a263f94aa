use thiserror::Error;

/// Why a queued job body could not be turned into a typed job.
///
/// A decode failure is permanent: redelivering the same bytes can never
/// succeed, so consumers drop the message after logging it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobDecodeError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(String),
    #[error("payload is not a JSON object")]
    NotAnObject,
    #[error("missing required key '{0}'")]
    MissingKey(&'static str),
    #[error("key '{key}' has an invalid value: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Outcome of a failed job handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The job can never succeed (e.g. it targets a subject that does not exist).
    #[error("permanent failure: {0}")]
    Permanent(String),
    /// The store or a downstream service failed; the job should be redelivered.
    #[error("transient failure: {0}")]
    Transient(String),
}

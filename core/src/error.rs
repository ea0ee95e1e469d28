use thiserror::Error;

/// Errors emitted by `StudyTracker` and the stores behind it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    #[error("unknown lesson '{0}'")]
    UnknownLesson(String),
    #[error("topic must not be empty")]
    EmptyTopic,
    #[error("topic '{topic}' already exists in lesson '{lesson}'")]
    DuplicateTopic { lesson: String, topic: String },
    #[error("topic '{topic}' not found in lesson '{lesson}'")]
    TopicNotFound { lesson: String, topic: String },
    #[error("no study log with id '{0}'")]
    LogNotFound(String),
    #[error("log id prefix '{prefix}' is ambiguous ({matches} matches)")]
    AmbiguousLogId { prefix: String, matches: usize },
    #[error("store I/O failed: {0}")]
    Store(#[from] std::io::Error),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

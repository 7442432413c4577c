use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid segment list: {0}")]
    InvalidSegments(String),

    #[error("Invalid video duration: {0} ms")]
    InvalidDuration(u64),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TimelineError {
    pub fn segments(message: impl Into<String>) -> Self {
        Self::InvalidSegments(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type TimelineResult<T> = Result<T, TimelineError>;

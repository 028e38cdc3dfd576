use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("not initialized: run 'mboard init'")]
    NotInitialized,

    #[error("email already exists: {0}")]
    EmailExists(String),

    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("invalid priority: {0}")]
    InvalidPriority(String),

    #[error("invalid recurrence: {0}")]
    InvalidRecurrence(String),

    #[error("invalid owner kind: {0}")]
    InvalidOwnerKind(String),

    #[error("invalid leaderboard metric: {0}")]
    InvalidMetric(String),

    #[error("remote rejected request with status {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("remote request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, BoardError>;

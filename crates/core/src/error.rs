use thiserror::Error;

pub type DashResult<T> = Result<T, DashError>;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream CRM unreachable or the token was rejected. The only failure
    /// that aborts a load cycle; zero records is not an error.
    #[error("CRM connection error: {0}")]
    Crm(String),

    #[error("Goal store error: {0}")]
    GoalStore(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

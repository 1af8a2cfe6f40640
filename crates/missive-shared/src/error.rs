use thiserror::Error;

#[derive(Error, Debug)]
pub enum MissiveError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid notification: {0}")]
    InvalidNotification(String),

    #[error("Unknown message status: {0}")]
    UnknownStatus(i32),
}

use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum SecurityError {
    #[error("Status listener failed: {0}")]
    ListenerFailed(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid command arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown sensor: {0}")]
    UnknownSensor(String),

    #[error("Failed to load repository from {path}: {reason}")]
    RepositoryLoadFailed { path: String, reason: String },

    #[error(transparent)]
    InstanceLock(#[from] crate::instance_lock::InstanceLockError),

    #[error(transparent)]
    ImageError(#[from] image::ImageError),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SecurityError>;

use statcard_core::QueueError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot build http client: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("delivery task failed: {0}")]
    Delivery(#[from] tokio::task::JoinError),
}

//! StatsProvider port - the statistics source behind the fetch stage.
//!
//! Network retries and rate-limit handling belong to implementations of this
//! trait, never to the queue.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::GitHubStats;
use crate::error::BoxError;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("rate limited by provider (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected provider response: {0}")]
    Decode(String),

    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
}

impl FetchError {
    /// Worth another attempt after a delay?
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::RateLimited { .. } | FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::UserNotFound(_) | FetchError::Decode(_) => false,
        }
    }
}

#[async_trait]
pub trait StatsProvider: Send + Sync + 'static {
    async fn user_stats(&self, username: &str) -> Result<GitHubStats, FetchError>;
}

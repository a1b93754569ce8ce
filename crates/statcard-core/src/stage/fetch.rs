use async_trait::async_trait;
use tracing::debug;

use crate::domain::{FetchRequest, GitHubStats};
use crate::error::BoxError;
use crate::ports::StatsProvider;
use crate::queue::Execute;

/// Executor of the fetch stage.
pub struct FetchStage<S> {
    provider: S,
}

impl<S> FetchStage<S> {
    pub fn new(provider: S) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<S, M> Execute<FetchRequest, GitHubStats, M> for FetchStage<S>
where
    S: StatsProvider,
    M: Send + Sync + 'static,
{
    async fn execute(&self, task: FetchRequest, _meta: &M) -> Result<GitHubStats, BoxError> {
        debug!(username = %task.username, "fetching stats");
        Ok(self.provider.user_stats(&task.username).await?)
    }
}

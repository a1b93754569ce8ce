use async_trait::async_trait;
use tracing::debug;

use crate::domain::{GitHubStats, RenderedCard};
use crate::error::BoxError;
use crate::ports::CardRenderer;
use crate::queue::Execute;

/// Executor of the render stage.
pub struct RenderStage<R> {
    renderer: R,
}

impl<R> RenderStage<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl<R, M> Execute<GitHubStats, RenderedCard, M> for RenderStage<R>
where
    R: CardRenderer,
    M: Send + Sync + 'static,
{
    async fn execute(&self, stats: GitHubStats, _meta: &M) -> Result<RenderedCard, BoxError> {
        debug!(username = %stats.username, "rendering card");
        let card = self.renderer.render(&stats).await?;
        debug!(username = %stats.username, bytes = card.bytes.len(), "card rendered");
        Ok(card)
    }
}

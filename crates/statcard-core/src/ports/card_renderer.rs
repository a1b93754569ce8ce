//! CardRenderer port - turns statistics into a card document.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{GitHubStats, RenderedCard};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("stats element #{0} not found")]
    AnchorMissing(&'static str),
}

#[async_trait]
pub trait CardRenderer: Send + Sync + 'static {
    async fn render(&self, stats: &GitHubStats) -> Result<RenderedCard, RenderError>;
}

//! Card renderer filling the HTML blueprint.
//!
//! Produces the filled page itself; rasterising it in a headless browser is
//! left to an external renderer implementing the same port.

use async_trait::async_trait;
use statcard_core::domain::{Blueprint, GitHubStats, RenderedCard, STATS_ANCHOR_ID, has_stats_anchor};
use statcard_core::ports::{CardRenderer, RenderError};

pub struct HtmlCardRenderer {
    blueprint: Blueprint,
}

impl HtmlCardRenderer {
    pub fn new(blueprint: Blueprint) -> Self {
        Self { blueprint }
    }
}

#[async_trait]
impl CardRenderer for HtmlCardRenderer {
    async fn render(&self, stats: &GitHubStats) -> Result<RenderedCard, RenderError> {
        let page = self.blueprint.fill(stats);
        if !has_stats_anchor(&page) {
            return Err(RenderError::AnchorMissing(STATS_ANCHOR_ID));
        }
        Ok(RenderedCard::html(page))
    }
}

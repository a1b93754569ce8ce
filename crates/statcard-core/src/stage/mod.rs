//! Stage adapters: each pipeline stage is a [`TaskQueue`] whose executor wraps
//! exactly one collaborator.
//!
//! ```ignore
//! let fetcher = stage::fetcher::<_, Meta>(provider);
//! let generator = stage::generator::<_, Meta>(renderer);
//! let pipeline = fetcher.pipe(&generator);
//! ```

mod fetch;
mod render;

pub use self::fetch::FetchStage;
pub use self::render::RenderStage;

use crate::domain::{FetchRequest, GitHubStats, RenderedCard};
use crate::ports::{CardRenderer, StatsProvider};
use crate::queue::TaskQueue;

/// Queue turning a username into its statistics.
pub fn fetcher<S, M>(provider: S) -> TaskQueue<FetchRequest, GitHubStats, M>
where
    S: StatsProvider,
    M: Send + Sync + 'static,
{
    TaskQueue::new(FetchStage::new(provider))
}

/// Queue turning statistics into a rendered card.
pub fn generator<R, M>(renderer: R) -> TaskQueue<GitHubStats, RenderedCard, M>
where
    R: CardRenderer,
    M: Send + Sync + 'static,
{
    TaskQueue::new(RenderStage::new(renderer))
}

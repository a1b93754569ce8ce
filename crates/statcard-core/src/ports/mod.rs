//! Ports - the collaborators each pipeline stage wraps.
//!
//! The queue only needs "an async function from (task, meta) to payload";
//! these traits are the concrete seams the stage adapters put around the
//! statistics provider and the renderer.

pub mod card_renderer;
pub mod stats_provider;

pub use self::card_renderer::{CardRenderer, RenderError};
pub use self::stats_provider::{FetchError, StatsProvider};

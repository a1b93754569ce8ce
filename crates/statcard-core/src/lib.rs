//! statcard-core
//!
//! Building blocks for the statcard bot: a generic asynchronous task queue and
//! the stages that turn a GitHub username into a rendered statistics card.
//!
//! # Modules
//! - **queue**: `TaskQueue` (FIFO buffer, single execution loop, per-task
//!   futures, broadcast consumer, lifecycle) and `pipe` composition
//! - **domain**: statistics record, stage payloads, formatting, card template
//! - **ports**: collaborator traits (`StatsProvider`, `CardRenderer`)
//! - **stage**: adapters wrapping one collaborator each behind a queue
//! - **error**: `QueueError` and the shared error aliases

pub mod domain;
pub mod error;
pub mod ports;
pub mod queue;
pub mod stage;

pub use self::error::{BoxError, QueueError};
pub use self::queue::{Execute, ExecuteFn, QueueState, TaskHandle, TaskQueue, TaskResult};

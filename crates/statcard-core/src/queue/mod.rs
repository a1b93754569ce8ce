//! Queue module: lifecycle state, result model, the execution loop and
//! pipeline composition.

mod handle;
mod pipe;
mod result;
mod state;
mod task_queue;

pub use handle::TaskHandle;
pub use pipe::Pipe;
pub use result::TaskResult;
pub use state::QueueState;
pub use task_queue::TaskQueue;

use std::future::Future;

use async_trait::async_trait;

use crate::error::BoxError;

/// Execution function of a queue.
///
/// Design intent:
/// - The queue owns ordering, result delivery and lifecycle.
/// - The executor only turns one `(task, meta)` into a payload or an error.
/// - Errors are never retried by the queue; retry belongs to the executor's
///   collaborators.
#[async_trait]
pub trait Execute<T, P, M>: Send + Sync + 'static {
    async fn execute(&self, task: T, meta: &M) -> Result<P, BoxError>;
}

/// Adapter turning a closure `Fn(T, M) -> Future` into an [`Execute`].
///
/// The closure receives its own copy of the metadata.
pub struct ExecuteFn<F>(pub F);

#[async_trait]
impl<F, Fut, T, P, M> Execute<T, P, M> for ExecuteFn<F>
where
    F: Fn(T, M) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, BoxError>> + Send + 'static,
    T: Send + 'static,
    P: Send + 'static,
    M: Clone + Send + Sync + 'static,
{
    async fn execute(&self, task: T, meta: &M) -> Result<P, BoxError> {
        (self.0)(task, meta.clone()).await
    }
}

//! Pipeline composition: two queues presented as one execution function.

use async_trait::async_trait;

use super::{Execute, TaskQueue};
use crate::error::BoxError;

/// Executor of a composed queue (see [`TaskQueue::pipe`]).
///
/// Stage one's failure short-circuits stage two; the composed failure carries
/// the failing stage's error unchanged.
pub struct Pipe<T, P, O, M> {
    head: TaskQueue<T, P, M>,
    tail: TaskQueue<P, O, M>,
}

impl<T, P, O, M> Pipe<T, P, O, M> {
    pub fn new(head: TaskQueue<T, P, M>, tail: TaskQueue<P, O, M>) -> Self {
        Self { head, tail }
    }
}

#[async_trait]
impl<T, P, O, M> Execute<T, O, M> for Pipe<T, P, O, M>
where
    T: Send + 'static,
    P: Send + 'static,
    O: Send + 'static,
    M: Clone + Send + Sync + 'static,
{
    async fn execute(&self, task: T, meta: &M) -> Result<O, BoxError> {
        let (meta, first) = self.head.add_task(task, meta.clone()).await.into_parts();
        let payload = first?;

        let (_, second) = self.tail.add_task(payload, meta).await.into_parts();
        Ok(second?)
    }
}

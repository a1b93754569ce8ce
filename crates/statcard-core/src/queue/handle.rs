//! Per-task result future.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::TaskResult;

/// Resolves exactly once with the [`TaskResult`] of one submitted task.
///
/// A task that is never executed (left buffered when its queue stopped, or
/// whose queue was dropped) never settles. Callers that need a bound should
/// wrap the handle in `tokio::time::timeout`.
#[must_use = "dropping a handle discards the task's result (the task still runs)"]
pub struct TaskHandle<P, M> {
    receiver: oneshot::Receiver<TaskResult<P, M>>,
    abandoned: bool,
}

impl<P, M> TaskHandle<P, M> {
    pub(crate) fn new(receiver: oneshot::Receiver<TaskResult<P, M>>) -> Self {
        Self {
            receiver,
            abandoned: false,
        }
    }
}

impl<P, M> Future for TaskHandle<P, M> {
    type Output = TaskResult<P, M>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.abandoned {
            return Poll::Pending;
        }
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            // resolver dropped without a result: stays unsettled
            Poll::Ready(Err(_)) => {
                this.abandoned = true;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

//! The queue core: FIFO buffer, single execution loop, per-task futures,
//! broadcast consumer and lifecycle.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, warn};

use super::{Execute, ExecuteFn, Pipe, QueueState, TaskHandle, TaskResult};
use crate::error::{BoxError, QueueError};

type Consumer<P, M> = Arc<dyn Fn(&TaskResult<P, M>) -> Result<(), BoxError> + Send + Sync>;

/// A task waiting in the buffer, bound to the future that will receive its result.
struct PendingTask<T, P, M> {
    task: T,
    meta: M,
    resolver: oneshot::Sender<TaskResult<P, M>>,
}

/// State shared between the handles and the loop.
///
/// Design:
/// - The unbounded channel is the FIFO buffer. A loop blocked on `recv` gets a
///   new task handed over directly; otherwise it waits in the channel.
/// - The receiving half is owned by the running loop and parked in `receiver`
///   while idle, so at most one loop can ever drain it.
/// - Lifecycle and consumer are published through `watch` channels.
struct Shared<T, P, M> {
    executor: Box<dyn Execute<T, P, M>>,
    tasks: mpsc::UnboundedSender<PendingTask<T, P, M>>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<PendingTask<T, P, M>>>>,
    state: watch::Sender<QueueState>,
    consumer: watch::Sender<Option<Consumer<P, M>>>,
}

/// Asynchronous FIFO task queue executing one task at a time.
///
/// # Example
/// ```ignore
/// let queue = TaskQueue::from_fn(|name: String, _meta: ()| async move {
///     Ok::<_, BoxError>(name.to_uppercase())
/// });
/// queue.start()?;
/// let result = queue.add_task("a".to_string(), ()).await;
/// queue.stop().await;
/// ```
///
/// Handles are cheap to clone; clones address the same queue. Dropping the
/// last handle ends a running loop after its task in flight; tasks still
/// buffered are dropped with it and their handles never settle.
pub struct TaskQueue<T, P, M> {
    shared: Arc<Shared<T, P, M>>,
}

impl<T, P, M> Clone for TaskQueue<T, P, M> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, P, M> TaskQueue<T, P, M>
where
    T: Send + 'static,
    P: Send + 'static,
    M: Send + Sync + 'static,
{
    pub fn new<E>(executor: E) -> Self
    where
        E: Execute<T, P, M>,
    {
        let (tasks, receiver) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(QueueState::Idle);
        let (consumer, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                executor: Box::new(executor),
                tasks,
                receiver: Mutex::new(Some(receiver)),
                state,
                consumer,
            }),
        }
    }

    /// Build a queue from a closure `Fn(task, meta) -> Future<Result<payload>>`.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(T, M) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<P, BoxError>> + Send + 'static,
        M: Clone,
    {
        Self::new(ExecuteFn(f))
    }

    pub fn state(&self) -> QueueState {
        *self.shared.state.borrow()
    }

    /// Enqueue a task. Accepted in every state; only a running loop executes it.
    ///
    /// Never blocks. Await the returned handle for this task's result.
    pub fn add_task(&self, task: T, meta: M) -> TaskHandle<P, M> {
        let (resolver, receiver) = oneshot::channel();
        let pending = PendingTask {
            task,
            meta,
            resolver,
        };
        if self.shared.tasks.send(pending).is_err() {
            // only possible if a loop died holding the receiver
            error!("task receiver is gone; task will never run");
        }
        TaskHandle::new(receiver)
    }

    /// Install the broadcast consumer (last write wins).
    ///
    /// It is called once per result, in execution order, before the task's own
    /// handle resolves. Errors and panics are logged and otherwise ignored.
    pub fn set_consumer<F>(&self, consumer: F)
    where
        F: Fn(&TaskResult<P, M>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.shared.consumer.send_replace(Some(Arc::new(consumer)));
    }

    /// Remove the broadcast consumer, dropping whatever it captured.
    pub fn clear_consumer(&self) {
        self.shared.consumer.send_replace(None);
    }

    /// Idle -> Running; spawns the loop on the current tokio runtime.
    ///
    /// No-op while running or stopping.
    pub fn start(&self) -> Result<(), QueueError> {
        let started = self.shared.state.send_if_modified(|state| {
            if state.is_idle() {
                *state = QueueState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            return Ok(());
        }

        let receiver = self
            .shared
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(receiver) = receiver else {
            self.shared.state.send_replace(QueueState::Idle);
            return Err(QueueError::LoopInvariant);
        };

        debug!("queue started");
        tokio::spawn(run_loop(Arc::downgrade(&self.shared), receiver));
        Ok(())
    }

    /// Request cooperative shutdown.
    ///
    /// The returned future resolves once the loop has exited and the queue is
    /// idle. The task in flight (if any) is finished first; buffered tasks are
    /// left in the buffer and their handles stay unsettled until a later
    /// `start`. Repeated calls return equivalent signals.
    pub fn stop(&self) -> impl Future<Output = ()> + Send + use<T, P, M> {
        let requested = self.shared.state.send_if_modified(|state| {
            if state.is_running() {
                *state = QueueState::Stopping;
                true
            } else {
                false
            }
        });
        if requested {
            debug!("queue stop requested");
        }

        let mut state = self.shared.state.subscribe();
        async move {
            // closed means the queue itself is gone; nothing left to wait for
            let _ = state.wait_for(|s| *s != QueueState::Stopping).await;
        }
    }

    /// Chain `next` after this queue.
    ///
    /// The composed queue submits each task here, and on success submits the
    /// payload (same meta) to `next`. A failure in either stage becomes the
    /// composed task's failure, unchanged. The composed queue must be started
    /// on its own; it never starts or stops the stages.
    pub fn pipe<O>(&self, next: &TaskQueue<P, O, M>) -> TaskQueue<T, O, M>
    where
        O: Send + 'static,
        M: Clone,
    {
        TaskQueue::new(Pipe::new(self.clone(), next.clone()))
    }
}

impl<T, P, M> Shared<T, P, M>
where
    T: Send + 'static,
    P: Send + 'static,
    M: Send + Sync + 'static,
{
    async fn run_one(&self, pending: PendingTask<T, P, M>) {
        let PendingTask {
            task,
            meta,
            resolver,
        } = pending;

        let outcome = AssertUnwindSafe(self.executor.execute(task, &meta))
            .catch_unwind()
            .await;
        let result = match outcome {
            Ok(Ok(payload)) => TaskResult::success(meta, payload),
            Ok(Err(err)) => {
                let err = QueueError::execution(err);
                warn!(error = %err, "task failed");
                TaskResult::failure(meta, err)
            }
            Err(panic) => {
                let err = QueueError::execution_panic(panic);
                warn!(error = %err, "task panicked");
                TaskResult::failure(meta, err)
            }
        };

        self.consume(&result);
        // the handle may have been dropped; then nobody is waiting
        let _ = resolver.send(result);
    }

    fn consume(&self, result: &TaskResult<P, M>) {
        let Some(consumer) = self.consumer.borrow().clone() else {
            return;
        };
        let err = match std::panic::catch_unwind(AssertUnwindSafe(|| consumer(result))) {
            Ok(Ok(())) => return,
            Ok(Err(err)) => QueueError::consumer(err),
            Err(panic) => QueueError::consumer_panic(panic),
        };
        error!(error = %err, "consumer failed");
    }
}

async fn run_loop<T, P, M>(
    shared: Weak<Shared<T, P, M>>,
    mut tasks: mpsc::UnboundedReceiver<PendingTask<T, P, M>>,
) where
    T: Send + 'static,
    P: Send + 'static,
    M: Send + Sync + 'static,
{
    let Some(mut state) = shared.upgrade().map(|shared| shared.state.subscribe()) else {
        return;
    };
    loop {
        if !state.borrow_and_update().is_running() {
            break;
        }

        // a stop request races the wait for the next task
        let next = tokio::select! {
            biased;
            changed = state.changed() => match changed {
                Ok(()) => continue,
                Err(_) => {
                    debug!("queue dropped; loop exiting");
                    return;
                }
            },
            next = tasks.recv() => next,
        };
        let Some(pending) = next else {
            break;
        };
        let Some(strong) = shared.upgrade() else {
            return;
        };

        strong.run_one(pending).await;
    }

    let Some(shared) = shared.upgrade() else {
        return;
    };
    // park the receiver before going idle so the next start finds it
    *shared
        .receiver
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = Some(tasks);
    shared.state.send_replace(QueueState::Idle);
    debug!("queue loop exited");
}

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Error type returned by executors and consumers.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Shared, opaque cause of a failure.
///
/// The same cause is handed to a task's future and to the broadcast consumer,
/// and a pipeline forwards it from stage to stage, so it lives behind an `Arc`.
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Clone, Error)]
pub enum QueueError {
    #[error("task execution failed: {0}")]
    ExecutionFailed(Cause),

    #[error("result consumer failed: {0}")]
    ConsumerFailed(Cause),

    #[error("queue loop invariant violated: task receiver missing while idle")]
    LoopInvariant,
}

impl QueueError {
    /// Wrap an executor error.
    ///
    /// An error that already is a `QueueError` is returned as is, so a
    /// composed queue reports the failing stage's error unchanged.
    pub fn execution(err: BoxError) -> Self {
        match err.downcast::<QueueError>() {
            Ok(err) => *err,
            Err(err) => QueueError::ExecutionFailed(Arc::from(err)),
        }
    }

    pub fn consumer(err: BoxError) -> Self {
        QueueError::ConsumerFailed(Arc::from(err))
    }

    /// Convert a caught panic payload into an execution failure.
    pub(crate) fn execution_panic(panic: Box<dyn Any + Send>) -> Self {
        QueueError::ExecutionFailed(Arc::new(Panicked::from_payload(panic)))
    }

    pub(crate) fn consumer_panic(panic: Box<dyn Any + Send>) -> Self {
        QueueError::ConsumerFailed(Arc::new(Panicked::from_payload(panic)))
    }

    /// The underlying cause, if any.
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            QueueError::ExecutionFailed(cause) | QueueError::ConsumerFailed(cause) => Some(cause),
            QueueError::LoopInvariant => None,
        }
    }
}

/// A panic caught while running user code.
#[derive(Debug)]
pub struct Panicked {
    message: String,
}

impl Panicked {
    fn from_payload(panic: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = panic.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }
}

impl fmt::Display for Panicked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panicked: {}", self.message)
    }
}

impl StdError for Panicked {}

//! Result model: the outcome of one task plus the caller's metadata.

use crate::error::QueueError;

/// The outcome of executing one task.
///
/// `meta` is whatever the producer attached at submission time and is carried
/// through unchanged. Exactly one of payload/error exists, selected by the
/// inner `Result`.
#[derive(Debug, Clone)]
pub struct TaskResult<P, M> {
    pub meta: M,
    pub outcome: Result<P, QueueError>,
}

impl<P, M> TaskResult<P, M> {
    pub fn success(meta: M, payload: P) -> Self {
        Self {
            meta,
            outcome: Ok(payload),
        }
    }

    pub fn failure(meta: M, error: QueueError) -> Self {
        Self {
            meta,
            outcome: Err(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn meta(&self) -> &M {
        &self.meta
    }

    pub fn payload(&self) -> Option<&P> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&QueueError> {
        self.outcome.as_ref().err()
    }

    pub fn into_parts(self) -> (M, Result<P, QueueError>) {
        (self.meta, self.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_carries_payload_and_meta() {
        let r: TaskResult<&str, u32> = TaskResult::success(7, "card");
        assert!(r.is_ok());
        assert_eq!(*r.meta(), 7);
        assert_eq!(r.payload(), Some(&"card"));
        assert!(r.error().is_none());
    }

    #[test]
    fn failure_carries_error_and_meta() {
        let r: TaskResult<(), &str> =
            TaskResult::failure("chat-42", QueueError::execution("boom".into()));
        assert!(!r.is_ok());
        assert!(r.payload().is_none());

        let (meta, outcome) = r.into_parts();
        assert_eq!(meta, "chat-42");
        assert_eq!(
            outcome.unwrap_err().to_string(),
            "task execution failed: boom"
        );
    }
}

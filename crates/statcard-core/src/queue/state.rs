//! Lifecycle state machine for a queue's execution loop.

use serde::{Deserialize, Serialize};

/// Queue lifecycle state.
///
/// State transitions:
/// - Idle -> Running (`start`)
/// - Running -> Stopping (`stop`)
/// - Stopping -> Idle (loop observes the stop request with no task in flight)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueState {
    /// Never started, or fully stopped.
    #[default]
    Idle,

    /// Loop active, executing tasks.
    Running,

    /// Shutdown requested; the loop exits after the task in flight.
    Stopping,
}

impl QueueState {
    /// May the loop pick up another task?
    pub fn is_running(self) -> bool {
        matches!(self, QueueState::Running)
    }

    pub fn is_idle(self) -> bool {
        matches!(self, QueueState::Idle)
    }
}

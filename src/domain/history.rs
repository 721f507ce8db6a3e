//! Immutable audit events recording committed task mutations.

use super::{OrgEntity, TaskId, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One committed state change on a task.
///
/// Events are never mutated after creation. The history sink replays them
/// in append order, one event per successful mutating facade call; error
/// paths never produce an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHistoryEvent {
    /// Task the event belongs to.
    pub task_id: TaskId,
    /// Operation or property name that produced the event.
    pub event: String,
    /// Status before the mutation.
    pub old_status: TaskStatus,
    /// Status after the mutation.
    pub new_status: TaskStatus,
    /// Priority before the mutation.
    pub old_priority: TaskPriority,
    /// Priority after the mutation.
    pub new_priority: TaskPriority,
    /// Actual owner before the mutation.
    pub start_owner: Option<OrgEntity>,
    /// Actual owner after the mutation.
    pub end_owner: Option<OrgEntity>,
    /// Identity that performed the mutation.
    pub actor: OrgEntity,
    /// Instant the event was recorded.
    pub occurred_at: DateTime<Utc>,
}

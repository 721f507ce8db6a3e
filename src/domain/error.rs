//! Error types for task domain validation and lifecycle enforcement.

use super::{OrgEntityName, TaskId, TaskOperation, TaskStatus};
use thiserror::Error;

/// Errors raised by the lifecycle engine.
///
/// Exactly two kinds gate every operation: [`LifecycleError::InvalidState`]
/// when the task's current status (or a derived flag such as skippability)
/// does not satisfy the operation's precondition, and
/// [`LifecycleError::AccessDenied`] when the status precondition passed but
/// the caller holds none of the required roles. Status is always checked
/// before authorisation. The third, narrower kind guards the single business
/// rule that an actual owner must be an individual.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// The task's current status does not permit the operation.
    #[error("task {task_id} in status {status} does not permit {operation}")]
    InvalidState {
        /// Task whose status failed the precondition.
        task_id: TaskId,
        /// Status the task held when the operation was attempted.
        status: TaskStatus,
        /// Operation that was rejected.
        operation: TaskOperation,
    },

    /// The caller holds none of the roles the operation requires.
    #[error("caller '{caller}' is not authorised to {operation} task {task_id}")]
    AccessDenied {
        /// Task the caller attempted to mutate.
        task_id: TaskId,
        /// Name of the rejected caller.
        caller: OrgEntityName,
        /// Operation that was rejected.
        operation: TaskOperation,
    },

    /// A group identity can never be assigned as actual owner.
    #[error("group '{0}' cannot be assigned as actual owner")]
    GroupActualOwner(OrgEntityName),
}

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The organisational entity name is empty after trimming.
    #[error("organisational entity name must not be empty")]
    EmptyEntityName,

    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// The comment text is empty after trimming.
    #[error("comment text must not be empty")]
    EmptyComment,
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);

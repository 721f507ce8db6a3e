//! Repository port for task persistence with optimistic concurrency.

use crate::domain::{TaskId, TaskRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// The engine never serialises concurrent callers itself; the repository's
/// version check is the cross-caller conflict detector. A facade reads a
/// record at version `V`, mutates a copy, and commits with
/// `expected_version = V`; a concurrent commit in between surfaces as
/// [`TaskRepositoryError::StaleVersion`], a retryable conflict distinct
/// from the engine's own error kinds.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID
    /// already exists.
    async fn store(&self, task: &TaskRecord) -> TaskRepositoryResult<()>;

    /// Persists a mutated task, committing only when the stored version
    /// still equals `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist and [`TaskRepositoryError::StaleVersion`] when another commit
    /// won the race.
    async fn update(&self, task: &TaskRecord, expected_version: u64) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<TaskRecord>>;

    /// Returns the direct subtasks of the given parent task.
    async fn find_subtasks(&self, parent: TaskId) -> TaskRepositoryResult<Vec<TaskRecord>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Another caller committed the task since it was read.
    #[error("stale version for task {task_id}: expected {expected}, stored {stored}")]
    StaleVersion {
        /// Task whose commit lost the race.
        task_id: TaskId,
        /// Version the caller read before mutating.
        expected: u64,
        /// Version currently stored.
        stored: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

//! History sink port for audit event durability.

use crate::domain::{TaskHistoryEvent, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for history sink operations.
pub type TaskHistoryResult<T> = Result<T, TaskHistoryError>;

/// Append-only audit history contract.
///
/// The sink owns durability; the facade guarantees `append` is called
/// exactly once per successful mutating operation, in invocation order,
/// and never on an error path.
#[async_trait]
pub trait TaskHistorySink: Send + Sync {
    /// Appends one audit event.
    ///
    /// # Errors
    ///
    /// Returns [`TaskHistoryError::Persistence`] when the event cannot be
    /// made durable.
    async fn append(&self, event: TaskHistoryEvent) -> TaskHistoryResult<()>;

    /// Replays a task's events in append order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskHistoryError::Persistence`] when the history cannot be
    /// read.
    async fn history(&self, task_id: TaskId) -> TaskHistoryResult<Vec<TaskHistoryEvent>>;
}

/// Errors returned by history sink implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskHistoryError {
    /// Persistence-layer failure.
    #[error("history persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskHistoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

//! In-memory history sink for task lifecycle tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::{TaskHistoryEvent, TaskId};
use crate::ports::{TaskHistoryError, TaskHistoryResult, TaskHistorySink};

/// Thread-safe in-memory history sink preserving append order per task.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistorySink {
    events: Arc<RwLock<HashMap<TaskId, Vec<TaskHistoryEvent>>>>,
}

impl InMemoryHistorySink {
    /// Creates an empty in-memory history sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskHistorySink for InMemoryHistorySink {
    async fn append(&self, event: TaskHistoryEvent) -> TaskHistoryResult<()> {
        let mut events = self.events.write().map_err(|err| {
            TaskHistoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        events.entry(event.task_id).or_default().push(event);
        Ok(())
    }

    async fn history(&self, task_id: TaskId) -> TaskHistoryResult<Vec<TaskHistoryEvent>> {
        let events = self.events.read().map_err(|err| {
            TaskHistoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(events.get(&task_id).cloned().unwrap_or_default())
    }
}

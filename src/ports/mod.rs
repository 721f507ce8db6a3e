//! Port contracts between the task core and its collaborators.

mod history;
mod repository;

pub use history::{TaskHistoryError, TaskHistoryResult, TaskHistorySink};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};

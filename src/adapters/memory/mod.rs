//! In-memory adapters for the repository and history ports.

mod history;
mod task;

pub use history::InMemoryHistorySink;
pub use task::InMemoryTaskRepository;

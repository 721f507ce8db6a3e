//! Orchestration services exposed to callers of the task core.

mod facade;

pub use facade::{HumanTaskError, HumanTaskResult, HumanTaskService};

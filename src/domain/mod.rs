//! Domain model for human task lifecycle management.
//!
//! The domain models one unit of human work routed to people and groups for
//! claiming, execution, delegation, and completion. Authorisation is
//! dynamic: a caller's roles are derived per call from the task record's
//! assignment sets, never stored. The lifecycle engine enforces the status
//! and role preconditions of every transition while keeping all
//! infrastructure concerns outside of the domain boundary.

mod error;
mod history;
mod ids;
mod lifecycle;
mod record;
mod role;
mod status;

pub use error::{
    LifecycleError, ParsePriorityError, ParseTaskStatusError, TaskDomainError,
};
pub use history::TaskHistoryEvent;
pub use ids::{OrgEntity, OrgEntityKind, OrgEntityName, TaskId};
pub use lifecycle::{LifecycleEngine, LifecycleResult, StateMachine};
pub use record::{PersistedTaskData, SuspendedState, TaskComment, TaskRecord};
pub use role::{HumanRole, RoleSet, TaskPrincipal, derive_roles};
pub use status::{TaskOperation, TaskPriority, TaskStatus};

#[cfg(test)]
pub(crate) use lifecycle::MockLifecycleEngine;

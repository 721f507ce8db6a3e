//! The task lifecycle state machine.
//!
//! Every operation is a synchronous read-check-mutate sequence: the status
//! precondition is validated first, then the caller's derived roles, then
//! any argument rule, and only after every check passes is the record
//! mutated. No field is written before the last check, so the record is
//! untouched on every error path. The engine assumes exclusive access to
//! the record for the duration of one operation; cross-caller conflicts are
//! detected by the repository's optimistic version check, not here.

use super::{
    HumanRole, LifecycleError, OrgEntity, SuspendedState, TaskOperation, TaskPrincipal,
    TaskPriority, TaskRecord, TaskStatus,
};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::sync::Arc;

/// Result type for lifecycle engine operations.
pub type LifecycleResult = Result<(), LifecycleError>;

/// The lifecycle operation set.
///
/// The facade dispatches through this trait; test doubles implement it to
/// observe dispatch without running the real state machine.
#[cfg_attr(test, mockall::automock)]
pub trait LifecycleEngine: Send + Sync {
    /// Reserves a ready task for the caller.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidState`] unless status is `Ready`;
    /// [`LifecycleError::AccessDenied`] unless the caller is a potential
    /// owner or business administrator.
    fn claim(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult;

    /// Begins execution from `Reserved` (actual owner) or directly from
    /// `Ready` (potential owner, self-claiming).
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidState`] from any other status;
    /// [`LifecycleError::AccessDenied`] on a role mismatch.
    fn start(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult;

    /// Pauses an in-progress task back to `Reserved`.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidState`] / [`LifecycleError::AccessDenied`]
    /// per the transition table.
    fn stop(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult;

    /// Gives up ownership of a reserved task, returning it to `Ready`.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidState`] / [`LifecycleError::AccessDenied`]
    /// per the transition table.
    fn release(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult;

    /// Suspends the task indefinitely.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidState`] unless status is `Ready`, `Reserved`
    /// or `InProgress`; [`LifecycleError::AccessDenied`] on a role mismatch
    /// (the admissible role set depends on the from-status).
    fn suspend(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult;

    /// Suspends the task until the given instant.
    ///
    /// # Errors
    ///
    /// As [`LifecycleEngine::suspend`].
    fn suspend_until(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        until: DateTime<Utc>,
    ) -> LifecycleResult;

    /// Suspends the task for the given duration from now.
    ///
    /// # Errors
    ///
    /// As [`LifecycleEngine::suspend`].
    fn suspend_for(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        duration: Duration,
    ) -> LifecycleResult;

    /// Restores the pre-suspension status and owner, clearing the snapshot.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidState`] when no snapshot is present;
    /// [`LifecycleError::AccessDenied`] unless the caller is the actual
    /// owner, a business administrator, or a potential owner resuming a
    /// task that was suspended from `Ready`.
    fn resume(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult;

    /// Finishes an in-progress task successfully. Requires the actual-owner
    /// role exactly; elevated roles do not qualify.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidState`] / [`LifecycleError::AccessDenied`]
    /// per the transition table.
    fn complete(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult;

    /// Finishes an in-progress task with a fault. The payload is attached
    /// verbatim, never validated. Requires the actual-owner role exactly.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidState`] / [`LifecycleError::AccessDenied`]
    /// per the transition table.
    fn fail(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        fault: Option<serde_json::Value>,
    ) -> LifecycleResult;

    /// Completes a skippable task from any status. The skippability check
    /// takes precedence over the role check.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidState`] when the task is not skippable;
    /// [`LifecycleError::AccessDenied`] on a role mismatch.
    fn skip(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult;

    /// Hands the task to `target`, re-affirming `Ready` whatever the
    /// from-status was. The target joins the potential owners and becomes
    /// the actual owner.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::GroupActualOwner`] when the target is a group;
    /// [`LifecycleError::InvalidState`] / [`LifecycleError::AccessDenied`]
    /// per the transition table.
    fn forward(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        target: OrgEntity,
    ) -> LifecycleResult;

    /// Hands an in-progress task to `target` at the given priority,
    /// demoting it to `Reserved`.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::GroupActualOwner`] when the target is a group;
    /// [`LifecycleError::InvalidState`] / [`LifecycleError::AccessDenied`]
    /// per the transition table.
    fn delegate(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        target: OrgEntity,
        priority: TaskPriority,
    ) -> LifecycleResult;

    /// Moves a created task into circulation. With exactly one individual
    /// potential owner the task is auto-reserved for that owner; any other
    /// configuration yields `Ready` and requires an explicit claim.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidState`] / [`LifecycleError::AccessDenied`]
    /// per the transition table.
    fn activate(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult;

    /// Puts a created task in front of `target`: an individual is reserved
    /// the task outright, a group makes it claimable. Either way the target
    /// joins the potential owners.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::InvalidState`] / [`LifecycleError::AccessDenied`]
    /// per the transition table.
    fn nominate(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        target: OrgEntity,
    ) -> LifecycleResult;
}

/// Concrete lifecycle state machine.
#[derive(Clone)]
pub struct StateMachine<C> {
    clock: Arc<C>,
}

impl<C: Clock> StateMachine<C> {
    /// Creates a state machine reading time from the given clock.
    #[must_use]
    pub const fn new(clock: Arc<C>) -> Self {
        Self { clock }
    }

    fn suspend_with(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        suspension_ends: Option<DateTime<Utc>>,
    ) -> LifecycleResult {
        // Admissible roles depend on the from-status: a claimable task may
        // also be suspended by any potential owner.
        let roles: &[HumanRole] = match record.status() {
            TaskStatus::Ready => &[
                HumanRole::ActualOwner,
                HumanRole::PotentialOwner,
                HumanRole::BusinessAdministrator,
            ],
            TaskStatus::Reserved | TaskStatus::InProgress => {
                &[HumanRole::ActualOwner, HumanRole::BusinessAdministrator]
            }
            _ => {
                return Err(invalid_state(record, TaskOperation::Suspend));
            }
        };
        require_any_role(record, principal, roles, TaskOperation::Suspend)?;

        let snapshot = SuspendedState {
            original_status: record.status(),
            original_owner: record.actual_owner().cloned(),
            suspension_ends,
            operation_performed: self.clock.utc(),
        };
        record.set_suspended_state(snapshot);
        record.set_status(TaskStatus::Suspended);
        Ok(())
    }
}

impl<C: Clock + Send + Sync> LifecycleEngine for StateMachine<C> {
    fn claim(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult {
        require_status(record, &[TaskStatus::Ready], TaskOperation::Claim)?;
        require_any_role(
            record,
            principal,
            &[HumanRole::PotentialOwner, HumanRole::BusinessAdministrator],
            TaskOperation::Claim,
        )?;
        let owner = individual(principal.entity())?;

        record.set_actual_owner(Some(owner));
        record.set_status(TaskStatus::Reserved);
        Ok(())
    }

    fn start(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult {
        match record.status() {
            TaskStatus::Reserved => {
                require_any_role(
                    record,
                    principal,
                    &[HumanRole::ActualOwner],
                    TaskOperation::Start,
                )?;
            }
            TaskStatus::Ready => {
                require_any_role(
                    record,
                    principal,
                    &[HumanRole::PotentialOwner],
                    TaskOperation::Start,
                )?;
                let owner = individual(principal.entity())?;
                record.set_actual_owner(Some(owner));
            }
            _ => return Err(invalid_state(record, TaskOperation::Start)),
        }

        record.set_status(TaskStatus::InProgress);
        record.mark_started(&*self.clock);
        Ok(())
    }

    fn stop(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult {
        require_status(record, &[TaskStatus::InProgress], TaskOperation::Stop)?;
        require_any_role(
            record,
            principal,
            &[HumanRole::ActualOwner, HumanRole::BusinessAdministrator],
            TaskOperation::Stop,
        )?;

        record.set_status(TaskStatus::Reserved);
        Ok(())
    }

    fn release(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult {
        require_status(record, &[TaskStatus::Reserved], TaskOperation::Release)?;
        require_any_role(
            record,
            principal,
            &[HumanRole::ActualOwner, HumanRole::BusinessAdministrator],
            TaskOperation::Release,
        )?;

        record.set_actual_owner(None);
        record.set_status(TaskStatus::Ready);
        Ok(())
    }

    fn suspend(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult {
        self.suspend_with(record, principal, None)
    }

    fn suspend_until(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        until: DateTime<Utc>,
    ) -> LifecycleResult {
        self.suspend_with(record, principal, Some(until))
    }

    fn suspend_for(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        duration: Duration,
    ) -> LifecycleResult {
        let until = self.clock.utc() + duration;
        self.suspend_until(record, principal, until)
    }

    fn resume(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult {
        let Some(original_status) = record.suspended_state().map(|s| s.original_status) else {
            return Err(invalid_state(record, TaskOperation::Resume));
        };

        // A potential owner may only resume a task that was claimable when
        // it was suspended; reserved and in-progress suspensions belong to
        // the owner and the administrators.
        let roles: &[HumanRole] = if original_status == TaskStatus::Ready {
            &[
                HumanRole::ActualOwner,
                HumanRole::PotentialOwner,
                HumanRole::BusinessAdministrator,
            ]
        } else {
            &[HumanRole::ActualOwner, HumanRole::BusinessAdministrator]
        };
        require_any_role(record, principal, roles, TaskOperation::Resume)?;

        let Some(snapshot) = record.take_suspended_state() else {
            return Err(invalid_state(record, TaskOperation::Resume));
        };
        record.set_status(snapshot.original_status);
        record.set_actual_owner(snapshot.original_owner);
        Ok(())
    }

    fn complete(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult {
        require_status(record, &[TaskStatus::InProgress], TaskOperation::Complete)?;
        require_any_role(
            record,
            principal,
            &[HumanRole::ActualOwner],
            TaskOperation::Complete,
        )?;

        record.set_status(TaskStatus::Completed);
        record.mark_completed(&*self.clock);
        Ok(())
    }

    fn fail(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        fault: Option<serde_json::Value>,
    ) -> LifecycleResult {
        require_status(record, &[TaskStatus::InProgress], TaskOperation::Fail)?;
        require_any_role(
            record,
            principal,
            &[HumanRole::ActualOwner],
            TaskOperation::Fail,
        )?;

        record.set_fault(fault);
        record.set_status(TaskStatus::Failed);
        Ok(())
    }

    fn skip(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult {
        // The skippability flag gates this operation instead of the status,
        // and its failure outranks the role check.
        if !record.is_skippable() {
            return Err(invalid_state(record, TaskOperation::Skip));
        }
        require_any_role(
            record,
            principal,
            &[
                HumanRole::ActualOwner,
                HumanRole::BusinessAdministrator,
                HumanRole::TaskInitiator,
            ],
            TaskOperation::Skip,
        )?;

        record.set_status(TaskStatus::Completed);
        record.mark_completed(&*self.clock);
        Ok(())
    }

    fn forward(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        target: OrgEntity,
    ) -> LifecycleResult {
        let roles: &[HumanRole] = match record.status() {
            TaskStatus::Ready => &[
                HumanRole::ActualOwner,
                HumanRole::PotentialOwner,
                HumanRole::BusinessAdministrator,
            ],
            TaskStatus::Reserved | TaskStatus::InProgress => {
                &[HumanRole::ActualOwner, HumanRole::BusinessAdministrator]
            }
            _ => return Err(invalid_state(record, TaskOperation::Forward)),
        };
        require_any_role(record, principal, roles, TaskOperation::Forward)?;
        let owner = individual(&target)?;

        // Forwarding always re-affirms Ready, even from Reserved or
        // InProgress, and leaves the target installed as actual owner.
        record.add_potential_owner(target);
        record.set_actual_owner(Some(owner));
        record.set_status(TaskStatus::Ready);
        Ok(())
    }

    fn delegate(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        target: OrgEntity,
        priority: TaskPriority,
    ) -> LifecycleResult {
        require_status(record, &[TaskStatus::InProgress], TaskOperation::Delegate)?;
        require_any_role(
            record,
            principal,
            &[HumanRole::ActualOwner, HumanRole::BusinessAdministrator],
            TaskOperation::Delegate,
        )?;
        let owner = individual(&target)?;

        record.add_potential_owner(target);
        record.set_actual_owner(Some(owner));
        record.set_priority(priority);
        record.set_status(TaskStatus::Reserved);
        Ok(())
    }

    fn activate(&self, record: &mut TaskRecord, principal: &TaskPrincipal) -> LifecycleResult {
        require_status(record, &[TaskStatus::Created], TaskOperation::Activate)?;
        require_any_role(
            record,
            principal,
            &[HumanRole::BusinessAdministrator],
            TaskOperation::Activate,
        )?;

        // Tie-break: a single named potential owner is reserved the task
        // outright; zero, several, or a group leave it claimable.
        if let Some(owner) = record.sole_individual_potential_owner().cloned() {
            record.set_actual_owner(Some(owner));
            record.set_status(TaskStatus::Reserved);
        } else {
            record.set_status(TaskStatus::Ready);
        }
        Ok(())
    }

    fn nominate(
        &self,
        record: &mut TaskRecord,
        principal: &TaskPrincipal,
        target: OrgEntity,
    ) -> LifecycleResult {
        require_status(record, &[TaskStatus::Created], TaskOperation::Nominate)?;
        require_any_role(
            record,
            principal,
            &[HumanRole::BusinessAdministrator],
            TaskOperation::Nominate,
        )?;

        if target.is_group() {
            record.add_potential_owner(target);
            record.set_status(TaskStatus::Ready);
        } else {
            record.add_potential_owner(target.clone());
            record.set_actual_owner(Some(target));
            record.set_status(TaskStatus::Reserved);
        }
        Ok(())
    }
}

fn invalid_state(record: &TaskRecord, operation: TaskOperation) -> LifecycleError {
    LifecycleError::InvalidState {
        task_id: record.id(),
        status: record.status(),
        operation,
    }
}

fn require_status(
    record: &TaskRecord,
    allowed: &[TaskStatus],
    operation: TaskOperation,
) -> LifecycleResult {
    if allowed.contains(&record.status()) {
        Ok(())
    } else {
        Err(invalid_state(record, operation))
    }
}

fn require_any_role(
    record: &TaskRecord,
    principal: &TaskPrincipal,
    roles: &[HumanRole],
    operation: TaskOperation,
) -> LifecycleResult {
    if principal.has_any_role(roles) {
        Ok(())
    } else {
        Err(LifecycleError::AccessDenied {
            task_id: record.id(),
            caller: principal.entity().name().clone(),
            operation,
        })
    }
}

fn individual(entity: &OrgEntity) -> Result<OrgEntity, LifecycleError> {
    if entity.is_group() {
        return Err(LifecycleError::GroupActualOwner(entity.name().clone()));
    }
    Ok(entity.clone())
}

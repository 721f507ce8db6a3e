//! Public facade over the task lifecycle engine.
//!
//! The facade resolves the calling identity into roles, dispatches to the
//! lifecycle engine, and records exactly one audit event per committed
//! mutation. Caller identity is an explicit parameter on every call; no
//! ambient principal is ever stored, and roles are re-derived per call.

use crate::domain::{
    LifecycleEngine, LifecycleError, OrgEntity, TaskDomainError, TaskHistoryEvent, TaskId,
    TaskOperation, TaskPrincipal, TaskPriority, TaskRecord, TaskStatus,
};
use crate::ports::{
    TaskHistoryError, TaskHistorySink, TaskRepository, TaskRepositoryError,
};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for human task operations.
#[derive(Debug, Error)]
pub enum HumanTaskError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The lifecycle engine rejected the operation.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// History sink operation failed.
    #[error(transparent)]
    History(#[from] TaskHistoryError),
}

/// Result type for human task service operations.
pub type HumanTaskResult<T> = Result<T, HumanTaskError>;

/// Task facade: role resolution, engine dispatch, and audit recording.
///
/// Every state-mutating operation loads the record, captures the before
/// state, runs the engine on a working copy, and only on success bumps the
/// optimistic-concurrency version, persists, and appends one audit event
/// labeled with the operation name. When the engine rejects the call,
/// nothing is persisted and nothing is audited.
#[derive(Clone)]
pub struct HumanTaskService<R, H, E, C>
where
    R: TaskRepository,
    H: TaskHistorySink,
    E: LifecycleEngine,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    history: Arc<H>,
    engine: Arc<E>,
    clock: Arc<C>,
}

impl<R, H, E, C> HumanTaskService<R, H, E, C>
where
    R: TaskRepository,
    H: TaskHistorySink,
    E: LifecycleEngine,
    C: Clock + Send + Sync,
{
    /// Creates a new human task service.
    #[must_use]
    pub const fn new(repository: Arc<R>, history: Arc<H>, engine: Arc<E>, clock: Arc<C>) -> Self {
        Self {
            repository,
            history,
            engine,
            clock,
        }
    }

    /// Registers an externally built task record and audits its creation.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Repository`] when the identifier already
    /// exists or persistence fails.
    pub async fn create(&self, record: TaskRecord) -> HumanTaskResult<TaskRecord> {
        self.repository.store(&record).await?;
        let actor = record.initiator().clone();
        self.append_event(&record, &record, &actor, "create").await?;
        Ok(record)
    }

    /// Returns the task record.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::TaskNotFound`] when the task does not
    /// exist.
    pub async fn task(&self, id: TaskId) -> HumanTaskResult<TaskRecord> {
        self.load(id).await
    }

    /// Returns the task's audit history in append order.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::History`] when the sink cannot be read.
    pub async fn history(&self, id: TaskId) -> HumanTaskResult<Vec<TaskHistoryEvent>> {
        Ok(self.history.history(id).await?)
    }

    /// Returns the task's direct subtasks.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Repository`] when the lookup fails.
    pub async fn subtasks(&self, id: TaskId) -> HumanTaskResult<Vec<TaskRecord>> {
        Ok(self.repository.find_subtasks(id).await?)
    }

    /// Claims a ready task for the caller.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition.
    pub async fn claim(&self, id: TaskId, caller: &OrgEntity) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Claim, |engine, record, principal| {
            engine.claim(record, principal)
        })
        .await
    }

    /// Starts execution of the task.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition.
    pub async fn start(&self, id: TaskId, caller: &OrgEntity) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Start, |engine, record, principal| {
            engine.start(record, principal)
        })
        .await
    }

    /// Stops execution, returning the task to its owner's reserve.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition.
    pub async fn stop(&self, id: TaskId, caller: &OrgEntity) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Stop, |engine, record, principal| {
            engine.stop(record, principal)
        })
        .await
    }

    /// Releases a reserved task back to its potential owners.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition.
    pub async fn release(&self, id: TaskId, caller: &OrgEntity) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Release, |engine, record, principal| {
            engine.release(record, principal)
        })
        .await
    }

    /// Suspends the task indefinitely.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition.
    pub async fn suspend(&self, id: TaskId, caller: &OrgEntity) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Suspend, |engine, record, principal| {
            engine.suspend(record, principal)
        })
        .await
    }

    /// Suspends the task until the given instant.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition.
    pub async fn suspend_until(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        until: DateTime<Utc>,
    ) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Suspend, |engine, record, principal| {
            engine.suspend_until(record, principal, until)
        })
        .await
    }

    /// Suspends the task for the given duration from now.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition.
    pub async fn suspend_for(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        duration: Duration,
    ) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Suspend, |engine, record, principal| {
            engine.suspend_for(record, principal, duration)
        })
        .await
    }

    /// Resumes a suspended task.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition.
    pub async fn resume(&self, id: TaskId, caller: &OrgEntity) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Resume, |engine, record, principal| {
            engine.resume(record, principal)
        })
        .await
    }

    /// Completes an in-progress task. Fails without mutating anything when
    /// any direct subtask has not itself completed.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when a subtask is still open
    /// or the engine rejects the transition.
    pub async fn complete(&self, id: TaskId, caller: &OrgEntity) -> HumanTaskResult<TaskRecord> {
        let subtasks = self.repository.find_subtasks(id).await?;
        if let Some(open) = subtasks
            .iter()
            .find(|subtask| subtask.status() != TaskStatus::Completed)
        {
            return Err(LifecycleError::InvalidState {
                task_id: open.id(),
                status: open.status(),
                operation: TaskOperation::Complete,
            }
            .into());
        }

        self.mutate(id, caller, TaskOperation::Complete, |engine, record, principal| {
            engine.complete(record, principal)
        })
        .await
    }

    /// Fails an in-progress task, attaching the given fault payload.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition.
    pub async fn fail(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        fault: Option<serde_json::Value>,
    ) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Fail, |engine, record, principal| {
            engine.fail(record, principal, fault)
        })
        .await
    }

    /// Skips a skippable task.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition.
    pub async fn skip(&self, id: TaskId, caller: &OrgEntity) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Skip, |engine, record, principal| {
            engine.skip(record, principal)
        })
        .await
    }

    /// Forwards the task to another individual.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition or the target is a group.
    pub async fn forward(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        target: OrgEntity,
    ) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Forward, |engine, record, principal| {
            engine.forward(record, principal, target)
        })
        .await
    }

    /// Delegates an in-progress task to an individual at a given priority.
    ///
    /// This is the one role-checked path to the priority field; the
    /// [`HumanTaskService::set_priority`] setter deliberately is not.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition or the target is a group.
    pub async fn delegate(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        target: OrgEntity,
        priority: TaskPriority,
    ) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Delegate, |engine, record, principal| {
            engine.delegate(record, principal, target, priority)
        })
        .await
    }

    /// Activates a created task.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition.
    pub async fn activate(&self, id: TaskId, caller: &OrgEntity) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Activate, |engine, record, principal| {
            engine.activate(record, principal)
        })
        .await
    }

    /// Nominates an owner or group for a created task.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Lifecycle`] when the engine rejects the
    /// transition.
    pub async fn nominate(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        target: OrgEntity,
    ) -> HumanTaskResult<TaskRecord> {
        self.mutate(id, caller, TaskOperation::Nominate, |engine, record, principal| {
            engine.nominate(record, principal, target)
        })
        .await
    }

    /// Renames the task. Unconditional, but audited.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Domain`] when the name is empty.
    pub async fn set_name(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        name: impl Into<String> + Send,
    ) -> HumanTaskResult<TaskRecord> {
        let name = name.into();
        self.set_property(id, caller, "name", move |record| record.rename(name))
            .await
    }

    /// Replaces the task subject. Unconditional, but audited.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Repository`] when persistence fails.
    pub async fn set_subject(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        subject: impl Into<String> + Send,
    ) -> HumanTaskResult<TaskRecord> {
        let subject = subject.into();
        self.set_property(id, caller, "subject", move |record| {
            record.set_subject(subject);
            Ok(())
        })
        .await
    }

    /// Replaces the task priority directly. Unlike the priority carried by
    /// [`HumanTaskService::delegate`], this path is not role-checked, only
    /// audited.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Repository`] when persistence fails.
    pub async fn set_priority(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        priority: TaskPriority,
    ) -> HumanTaskResult<TaskRecord> {
        self.set_property(id, caller, "priority", move |record| {
            record.set_priority(priority);
            Ok(())
        })
        .await
    }

    /// Replaces the skippability flag. Unconditional, but audited.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Repository`] when persistence fails.
    pub async fn set_skippable(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        skippable: bool,
    ) -> HumanTaskResult<TaskRecord> {
        self.set_property(id, caller, "skippable", move |record| {
            record.set_skippable(skippable);
            Ok(())
        })
        .await
    }

    /// Adds a comment to the task. Unconditional, but audited.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Domain`] when the text is empty.
    pub async fn add_comment(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        text: impl Into<String> + Send,
    ) -> HumanTaskResult<TaskRecord> {
        let text = text.into();
        let author = caller.clone();
        let clock = Arc::clone(&self.clock);
        self.set_property(id, caller, "comment", move |record| {
            record.add_comment(author, text, &*clock)
        })
        .await
    }

    /// Adds an entry to the potential-owner set. Used by escalation
    /// collaborators to widen the audience of an unclaimed task.
    /// Unconditional, but audited.
    ///
    /// # Errors
    ///
    /// Returns [`HumanTaskError::Repository`] when persistence fails.
    pub async fn add_potential_owner(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        entity: OrgEntity,
    ) -> HumanTaskResult<TaskRecord> {
        self.set_property(id, caller, "potential_owners", move |record| {
            record.add_potential_owner(entity);
            Ok(())
        })
        .await
    }

    async fn load(&self, id: TaskId) -> HumanTaskResult<TaskRecord> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(HumanTaskError::TaskNotFound(id))
    }

    async fn mutate<F>(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        operation: TaskOperation,
        apply: F,
    ) -> HumanTaskResult<TaskRecord>
    where
        F: FnOnce(&E, &mut TaskRecord, &TaskPrincipal) -> Result<(), LifecycleError> + Send,
    {
        let current = self.load(id).await?;
        let mut updated = current.clone();
        // Roles are resolved fresh against the loaded record for this call
        // only; the principal is discarded with the call.
        let principal = TaskPrincipal::resolve(&updated, caller.clone());
        apply(self.engine.as_ref(), &mut updated, &principal)?;
        self.commit(&current, updated, caller, operation.as_str())
            .await
    }

    async fn set_property<F>(
        &self,
        id: TaskId,
        caller: &OrgEntity,
        property: &str,
        apply: F,
    ) -> HumanTaskResult<TaskRecord>
    where
        F: FnOnce(&mut TaskRecord) -> Result<(), TaskDomainError> + Send,
    {
        let current = self.load(id).await?;
        let mut updated = current.clone();
        apply(&mut updated)?;
        self.commit(&current, updated, caller, property).await
    }

    async fn commit(
        &self,
        before: &TaskRecord,
        mut after: TaskRecord,
        actor: &OrgEntity,
        event: &str,
    ) -> HumanTaskResult<TaskRecord> {
        after.bump_version();
        self.repository.update(&after, before.version()).await?;
        self.append_event(before, &after, actor, event).await?;
        Ok(after)
    }

    async fn append_event(
        &self,
        before: &TaskRecord,
        after: &TaskRecord,
        actor: &OrgEntity,
        event: &str,
    ) -> HumanTaskResult<()> {
        let entry = TaskHistoryEvent {
            task_id: after.id(),
            event: event.to_owned(),
            old_status: before.status(),
            new_status: after.status(),
            old_priority: before.priority(),
            new_priority: after.priority(),
            start_owner: before.actual_owner().cloned(),
            end_owner: after.actual_owner().cloned(),
            actor: actor.clone(),
            occurred_at: self.clock.utc(),
        };
        self.history.append(entry).await?;
        Ok(())
    }
}

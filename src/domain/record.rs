//! Task record aggregate and its suspension snapshot.

use super::{OrgEntity, TaskDomainError, TaskId, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Snapshot of the active state a task held before suspension.
///
/// Present on a record exactly while its status is
/// [`TaskStatus::Suspended`]. Only one level is remembered: a suspended task
/// can never be suspended again, so the snapshot never nests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspendedState {
    /// Status the task held when it was suspended.
    pub original_status: TaskStatus,
    /// Actual owner the task had when it was suspended.
    pub original_owner: Option<OrgEntity>,
    /// Instant the suspension lapses; `None` means indefinite. Expiry is a
    /// scheduling concern observed by an external deadline subsystem.
    pub suspension_ends: Option<DateTime<Utc>>,
    /// Instant the suspension was performed.
    pub operation_performed: DateTime<Utc>,
}

/// Free-form comment attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskComment {
    /// Identity that placed the comment.
    pub author: OrgEntity,
    /// Instant the comment was placed.
    pub placed_at: DateTime<Utc>,
    /// Comment text.
    pub text: String,
}

/// Mutable state of one task instance.
///
/// A pure data holder: every lifecycle mutation flows through the engine,
/// and the facade's property setters are the only other write path. The
/// `version` field is bumped once per committed mutation and used by the
/// persistence layer for optimistic-concurrency conflict detection.
///
/// Invariants, maintained by the engine rather than by this type:
/// a set `actual_owner` implies status `Reserved` or `InProgress` (with two
/// carve-outs: `Suspended`, where the original status lives in the snapshot,
/// and a freshly forwarded task, which keeps its new owner on a `Ready`
/// status); `suspended_state` is present exactly while status is
/// `Suspended`; `started_at` and `completed_at` are written at most once,
/// by the engine only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    id: TaskId,
    name: String,
    subject: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    is_skippable: bool,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    initiator: OrgEntity,
    actual_owner: Option<OrgEntity>,
    potential_owners: Vec<OrgEntity>,
    excluded_owners: Vec<OrgEntity>,
    business_administrators: Vec<OrgEntity>,
    stakeholders: Vec<OrgEntity>,
    recipients: Vec<OrgEntity>,
    potential_delegatees: Vec<OrgEntity>,
    suspended_state: Option<SuspendedState>,
    fault: Option<serde_json::Value>,
    parent: Option<TaskId>,
    comments: Vec<TaskComment>,
    version: u64,
}

/// Parameter object for reconstructing a persisted task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted task name.
    pub name: String,
    /// Persisted task subject, if any.
    pub subject: Option<String>,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted skippability flag.
    pub is_skippable: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted start timestamp, if work ever began.
    pub started_at: Option<DateTime<Utc>>,
    /// Persisted completion timestamp, if a terminal state was reached.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted initiator identity.
    pub initiator: OrgEntity,
    /// Persisted actual owner, if any.
    pub actual_owner: Option<OrgEntity>,
    /// Persisted potential owners in insertion order.
    pub potential_owners: Vec<OrgEntity>,
    /// Persisted excluded owners in insertion order.
    pub excluded_owners: Vec<OrgEntity>,
    /// Persisted business administrators in insertion order.
    pub business_administrators: Vec<OrgEntity>,
    /// Persisted stakeholders in insertion order.
    pub stakeholders: Vec<OrgEntity>,
    /// Persisted recipients in insertion order.
    pub recipients: Vec<OrgEntity>,
    /// Persisted potential delegatees in insertion order.
    pub potential_delegatees: Vec<OrgEntity>,
    /// Persisted suspension snapshot, if suspended.
    pub suspended_state: Option<SuspendedState>,
    /// Persisted fault payload, if the task failed.
    pub fault: Option<serde_json::Value>,
    /// Persisted parent task link, if any.
    pub parent: Option<TaskId>,
    /// Persisted comments in placement order.
    pub comments: Vec<TaskComment>,
    /// Persisted optimistic-concurrency version.
    pub version: u64,
}

impl TaskRecord {
    /// Creates a new task in status [`TaskStatus::Created`] with empty
    /// assignment sets.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskName`] when the name is empty
    /// after trimming.
    pub fn new(
        name: impl Into<String>,
        initiator: OrgEntity,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let normalized = validated_name(name)?;
        Ok(Self {
            id: TaskId::new(),
            name: normalized,
            subject: None,
            status: TaskStatus::Created,
            priority: TaskPriority::default(),
            is_skippable: false,
            created_at: clock.utc(),
            started_at: None,
            completed_at: None,
            initiator,
            actual_owner: None,
            potential_owners: Vec::new(),
            excluded_owners: Vec::new(),
            business_administrators: Vec::new(),
            stakeholders: Vec::new(),
            recipients: Vec::new(),
            potential_delegatees: Vec::new(),
            suspended_state: None,
            fault: None,
            parent: None,
            comments: Vec::new(),
            version: 0,
        })
    }

    /// Reconstructs a task record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            subject: data.subject,
            status: data.status,
            priority: data.priority,
            is_skippable: data.is_skippable,
            created_at: data.created_at,
            started_at: data.started_at,
            completed_at: data.completed_at,
            initiator: data.initiator,
            actual_owner: data.actual_owner,
            potential_owners: data.potential_owners,
            excluded_owners: data.excluded_owners,
            business_administrators: data.business_administrators,
            stakeholders: data.stakeholders,
            recipients: data.recipients,
            potential_delegatees: data.potential_delegatees,
            suspended_state: data.suspended_state,
            fault: data.fault,
            parent: data.parent,
            comments: data.comments,
            version: data.version,
        }
    }

    /// Sets the task subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        let value = subject.into();
        let normalized = value.trim();
        self.subject = (!normalized.is_empty()).then(|| normalized.to_owned());
        self
    }

    /// Sets the initial priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Marks the task as skippable.
    #[must_use]
    pub const fn with_skippable(mut self, skippable: bool) -> Self {
        self.is_skippable = skippable;
        self
    }

    /// Sets the potential owners.
    #[must_use]
    pub fn with_potential_owners(mut self, owners: impl IntoIterator<Item = OrgEntity>) -> Self {
        self.potential_owners = owners.into_iter().collect();
        self
    }

    /// Sets the excluded owners.
    #[must_use]
    pub fn with_excluded_owners(mut self, owners: impl IntoIterator<Item = OrgEntity>) -> Self {
        self.excluded_owners = owners.into_iter().collect();
        self
    }

    /// Sets the business administrators.
    #[must_use]
    pub fn with_business_administrators(
        mut self,
        administrators: impl IntoIterator<Item = OrgEntity>,
    ) -> Self {
        self.business_administrators = administrators.into_iter().collect();
        self
    }

    /// Sets the stakeholders.
    #[must_use]
    pub fn with_stakeholders(mut self, stakeholders: impl IntoIterator<Item = OrgEntity>) -> Self {
        self.stakeholders = stakeholders.into_iter().collect();
        self
    }

    /// Sets the recipients.
    #[must_use]
    pub fn with_recipients(mut self, recipients: impl IntoIterator<Item = OrgEntity>) -> Self {
        self.recipients = recipients.into_iter().collect();
        self
    }

    /// Sets the potential delegatees.
    #[must_use]
    pub fn with_potential_delegatees(
        mut self,
        delegatees: impl IntoIterator<Item = OrgEntity>,
    ) -> Self {
        self.potential_delegatees = delegatees.into_iter().collect();
        self
    }

    /// Links the task under a parent task.
    #[must_use]
    pub const fn with_parent(mut self, parent: TaskId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the task subject.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns `true` when the task may be skipped.
    #[must_use]
    pub const fn is_skippable(&self) -> bool {
        self.is_skippable
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the instant work first started, if it ever did.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns the instant the task reached a terminal state, if it did.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the initiator identity.
    #[must_use]
    pub const fn initiator(&self) -> &OrgEntity {
        &self.initiator
    }

    /// Returns the actual owner, if any.
    #[must_use]
    pub const fn actual_owner(&self) -> Option<&OrgEntity> {
        self.actual_owner.as_ref()
    }

    /// Returns the potential owners in insertion order.
    #[must_use]
    pub fn potential_owners(&self) -> &[OrgEntity] {
        &self.potential_owners
    }

    /// Returns the excluded owners in insertion order.
    #[must_use]
    pub fn excluded_owners(&self) -> &[OrgEntity] {
        &self.excluded_owners
    }

    /// Returns the business administrators in insertion order.
    #[must_use]
    pub fn business_administrators(&self) -> &[OrgEntity] {
        &self.business_administrators
    }

    /// Returns the stakeholders in insertion order.
    #[must_use]
    pub fn stakeholders(&self) -> &[OrgEntity] {
        &self.stakeholders
    }

    /// Returns the recipients in insertion order.
    #[must_use]
    pub fn recipients(&self) -> &[OrgEntity] {
        &self.recipients
    }

    /// Returns the potential delegatees in insertion order.
    #[must_use]
    pub fn potential_delegatees(&self) -> &[OrgEntity] {
        &self.potential_delegatees
    }

    /// Returns the suspension snapshot, if suspended.
    #[must_use]
    pub const fn suspended_state(&self) -> Option<&SuspendedState> {
        self.suspended_state.as_ref()
    }

    /// Returns the fault payload, if the task failed.
    #[must_use]
    pub const fn fault(&self) -> Option<&serde_json::Value> {
        self.fault.as_ref()
    }

    /// Returns the parent task, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<TaskId> {
        self.parent
    }

    /// Returns the comments in placement order.
    #[must_use]
    pub fn comments(&self) -> &[TaskComment] {
        &self.comments
    }

    /// Returns the optimistic-concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the sole potential owner when the set holds exactly one
    /// individual (non-group) entry.
    #[must_use]
    pub fn sole_individual_potential_owner(&self) -> Option<&OrgEntity> {
        match self.potential_owners.as_slice() {
            [owner] if !owner.is_group() => Some(owner),
            _ => None,
        }
    }

    /// Renames the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskName`] when the name is empty
    /// after trimming.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), TaskDomainError> {
        self.name = validated_name(name)?;
        Ok(())
    }

    /// Replaces the task subject.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        let value = subject.into();
        let normalized = value.trim();
        self.subject = (!normalized.is_empty()).then(|| normalized.to_owned());
    }

    /// Replaces the skippability flag.
    pub const fn set_skippable(&mut self, skippable: bool) {
        self.is_skippable = skippable;
    }

    /// Appends an entry to the potential-owner set.
    pub fn add_potential_owner(&mut self, entity: OrgEntity) {
        self.potential_owners.push(entity);
    }

    /// Appends a comment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyComment`] when the text is empty
    /// after trimming.
    pub fn add_comment(
        &mut self,
        author: OrgEntity,
        text: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        let value = text.into();
        let normalized = value.trim();
        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyComment);
        }
        self.comments.push(TaskComment {
            author,
            placed_at: clock.utc(),
            text: normalized.to_owned(),
        });
        Ok(())
    }

    pub(crate) const fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    pub(crate) fn set_actual_owner(&mut self, owner: Option<OrgEntity>) {
        self.actual_owner = owner;
    }

    pub(crate) const fn set_priority(&mut self, priority: TaskPriority) {
        self.priority = priority;
    }

    // Written at most once; a restart after Stop keeps the first instant.
    pub(crate) fn mark_started(&mut self, clock: &impl Clock) {
        if self.started_at.is_none() {
            self.started_at = Some(clock.utc());
        }
    }

    pub(crate) fn mark_completed(&mut self, clock: &impl Clock) {
        if self.completed_at.is_none() {
            self.completed_at = Some(clock.utc());
        }
    }

    pub(crate) fn set_suspended_state(&mut self, snapshot: SuspendedState) {
        self.suspended_state = Some(snapshot);
    }

    pub(crate) fn take_suspended_state(&mut self) -> Option<SuspendedState> {
        self.suspended_state.take()
    }

    pub(crate) fn set_fault(&mut self, fault: Option<serde_json::Value>) {
        self.fault = fault;
    }

    pub(crate) const fn bump_version(&mut self) {
        self.version += 1;
    }
}

fn validated_name(name: impl Into<String>) -> Result<String, TaskDomainError> {
    let raw = name.into();
    let normalized = raw.trim();
    if normalized.is_empty() {
        return Err(TaskDomainError::EmptyTaskName);
    }
    Ok(normalized.to_owned())
}

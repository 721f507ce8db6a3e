//! Identifier and identity types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for TaskId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated, trimmed, non-empty name of an organisational entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgEntityName(String);

impl OrgEntityName {
    /// Creates a validated entity name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyEntityName`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyEntityName);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for OrgEntityName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for OrgEntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of organisational entity referenced by an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgEntityKind {
    /// A single person.
    User,
    /// A named group of people.
    Group,
}

impl OrgEntityKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
        }
    }
}

/// Identity of a person or group referenced by task assignments.
///
/// Equality is by name and kind. Groups may appear in every assignment set
/// but can never be assigned as a task's actual owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgEntity {
    name: OrgEntityName,
    kind: OrgEntityKind,
}

impl OrgEntity {
    /// Creates a user identity.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyEntityName`] when the name is empty.
    pub fn user(name: impl Into<String>) -> Result<Self, TaskDomainError> {
        Ok(Self {
            name: OrgEntityName::new(name)?,
            kind: OrgEntityKind::User,
        })
    }

    /// Creates a group identity.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyEntityName`] when the name is empty.
    pub fn group(name: impl Into<String>) -> Result<Self, TaskDomainError> {
        Ok(Self {
            name: OrgEntityName::new(name)?,
            kind: OrgEntityKind::Group,
        })
    }

    /// Returns the entity name.
    #[must_use]
    pub const fn name(&self) -> &OrgEntityName {
        &self.name
    }

    /// Returns the entity kind.
    #[must_use]
    pub const fn kind(&self) -> OrgEntityKind {
        self.kind
    }

    /// Returns `true` when the entity is a group.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self.kind, OrgEntityKind::Group)
    }
}

impl fmt::Display for OrgEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

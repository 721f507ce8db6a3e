//! Task status, priority, and operation-name types.

use super::{ParsePriorityError, ParseTaskStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
///
/// `None` and `Error` have no programmatic incoming edges in this core:
/// `None` is the pre-creation placeholder and `Error` is reserved for
/// unrecoverable infrastructure faults raised outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// No status recorded yet.
    None,
    /// Task exists but has not been activated.
    Created,
    /// Task is claimable by its potential owners.
    Ready,
    /// Task has a single actual owner but work has not started.
    Reserved,
    /// Task is being worked on by its actual owner.
    InProgress,
    /// Task is paused; the pre-suspension state is held in a snapshot.
    Suspended,
    /// Task finished successfully.
    Completed,
    /// Task finished with a fault.
    Failed,
    /// Task hit an unrecoverable infrastructure fault.
    Error,
    /// Task was withdrawn and will never run.
    Obsolete,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Created => "created",
            Self::Ready => "ready",
            Self::Reserved => "reserved",
            Self::InProgress => "in_progress",
            Self::Suspended => "suspended",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Obsolete => "obsolete",
        }
    }

    /// Returns `true` when the status has no outgoing transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Obsolete)
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "created" => Some(Self::Created),
            "ready" => Some(Self::Ready),
            "reserved" => Some(Self::Reserved),
            "in_progress" => Some(Self::InProgress),
            "suspended" => Some(Self::Suspended),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "error" => Some(Self::Error),
            "obsolete" => Some(Self::Obsolete),
            _ => None,
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, ParseTaskStatusError> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::from_name(&normalized).ok_or_else(|| ParseTaskStatusError(value.to_owned()))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered task priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Below-normal urgency.
    Low,
    /// Default urgency.
    #[default]
    Normal,
    /// Above-normal urgency.
    High,
    /// Highest urgency.
    Critical,
}

impl TaskPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, ParsePriorityError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle operations gated by the engine.
///
/// The operation name doubles as the audit-history label for the matching
/// facade call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOperation {
    /// Reserve a ready task for the caller.
    Claim,
    /// Begin execution.
    Start,
    /// Pause execution back to reserved.
    Stop,
    /// Give up ownership of a reserved task.
    Release,
    /// Park the task, remembering the pre-suspension state.
    Suspend,
    /// Restore the pre-suspension state.
    Resume,
    /// Finish the task successfully.
    Complete,
    /// Finish the task with a fault.
    Fail,
    /// Complete a skippable task out of band.
    Skip,
    /// Hand the task to another potential owner.
    Forward,
    /// Hand an in-progress task to a delegatee at a given priority.
    Delegate,
    /// Move a created task into its claimable or reserved state.
    Activate,
    /// Put a created task in front of a chosen owner or group.
    Nominate,
}

impl TaskOperation {
    /// Returns the canonical operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Release => "release",
            Self::Suspend => "suspend",
            Self::Resume => "resume",
            Self::Complete => "complete",
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Forward => "forward",
            Self::Delegate => "delegate",
            Self::Activate => "activate",
            Self::Nominate => "nominate",
        }
    }
}

impl fmt::Display for TaskOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Generic human roles and per-call role derivation.
//!
//! A caller's roles are never stored on the task record. They are computed
//! on demand from the record's current assignment sets, so membership always
//! reflects the latest committed state even when assignment sets change
//! between reads.

use super::{OrgEntity, TaskRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability roles used purely as authorisation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumanRole {
    /// The identity that created the task.
    TaskInitiator,
    /// An identity with a business interest in the task outcome.
    TaskStakeholder,
    /// An identity eligible to claim or start the task.
    PotentialOwner,
    /// The single identity currently responsible for execution.
    ActualOwner,
    /// An identity with elevated authorisation over the task lifecycle.
    BusinessAdministrator,
    /// An identity barred from owning the task.
    ExcludedOwner,
    /// An identity receiving the task outcome.
    Recipient,
    /// An identity the task may be delegated to.
    PotentialDelegatee,
}

impl HumanRole {
    /// Returns the role name issued to external identity sources.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskInitiator => "task_initiator",
            Self::TaskStakeholder => "task_stakeholder",
            Self::PotentialOwner => "potential_owner",
            Self::ActualOwner => "actual_owner",
            Self::BusinessAdministrator => "business_administrator",
            Self::ExcludedOwner => "excluded_owner",
            Self::Recipient => "recipient",
            Self::PotentialDelegatee => "potential_delegatee",
        }
    }
}

impl fmt::Display for HumanRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The set of roles one caller holds against one task record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    roles: Vec<HumanRole>,
}

impl RoleSet {
    /// Returns `true` when the set contains the given role.
    #[must_use]
    pub fn holds(&self, role: HumanRole) -> bool {
        self.roles.contains(&role)
    }

    /// Returns `true` when the set contains any of the given roles.
    #[must_use]
    pub fn holds_any(&self, roles: &[HumanRole]) -> bool {
        roles.iter().any(|role| self.holds(*role))
    }

    /// Returns the held roles in derivation order.
    #[must_use]
    pub fn as_slice(&self) -> &[HumanRole] {
        &self.roles
    }

    fn grant_if(&mut self, condition: bool, role: HumanRole) {
        if condition {
            self.roles.push(role);
        }
    }
}

/// Computes the roles `caller` holds against `record`.
///
/// Pure and evaluated fresh per call; the result must not be cached across
/// calls. An identity listed among the excluded owners never derives the
/// potential-owner role, whatever the potential-owner set says.
#[must_use]
pub fn derive_roles(record: &TaskRecord, caller: &OrgEntity) -> RoleSet {
    let excluded = record.excluded_owners().contains(caller);

    let mut roles = RoleSet::default();
    roles.grant_if(record.initiator() == caller, HumanRole::TaskInitiator);
    roles.grant_if(
        record.actual_owner() == Some(caller),
        HumanRole::ActualOwner,
    );
    roles.grant_if(
        !excluded && record.potential_owners().contains(caller),
        HumanRole::PotentialOwner,
    );
    roles.grant_if(excluded, HumanRole::ExcludedOwner);
    roles.grant_if(
        record.business_administrators().contains(caller),
        HumanRole::BusinessAdministrator,
    );
    roles.grant_if(
        record.stakeholders().contains(caller),
        HumanRole::TaskStakeholder,
    );
    roles.grant_if(record.recipients().contains(caller), HumanRole::Recipient);
    roles.grant_if(
        record.potential_delegatees().contains(caller),
        HumanRole::PotentialDelegatee,
    );
    roles
}

/// Caller identity paired with the roles derived for one logical call.
///
/// Constructed by the facade immediately before each engine dispatch and
/// discarded afterwards. Distinct calls always re-derive, so a change of
/// ambient caller identity between calls can never leak stale roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPrincipal {
    entity: OrgEntity,
    roles: RoleSet,
}

impl TaskPrincipal {
    /// Derives the caller's roles against the record.
    #[must_use]
    pub fn resolve(record: &TaskRecord, entity: OrgEntity) -> Self {
        let roles = derive_roles(record, &entity);
        Self { entity, roles }
    }

    /// Returns the caller identity.
    #[must_use]
    pub const fn entity(&self) -> &OrgEntity {
        &self.entity
    }

    /// Returns the derived roles.
    #[must_use]
    pub const fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Returns `true` when the caller holds the given role.
    #[must_use]
    pub fn has_role(&self, role: HumanRole) -> bool {
        self.roles.holds(role)
    }

    /// Returns `true` when the caller holds any of the given roles.
    #[must_use]
    pub fn has_any_role(&self, roles: &[HumanRole]) -> bool {
        self.roles.holds_any(roles)
    }
}

//! Tests for per-call role derivation.

use super::fixtures::{alice, bob, group, ivan, mia, stranger, task_at};
use crate::domain::{HumanRole, TaskPrincipal, TaskStatus, derive_roles};
use rstest::rstest;

#[rstest]
fn initiator_derives_task_initiator_only() {
    let record = task_at(TaskStatus::Created);
    let roles = derive_roles(&record, &ivan());

    assert_eq!(roles.as_slice(), [HumanRole::TaskInitiator]);
}

#[rstest]
fn actual_owner_keeps_potential_owner_membership() {
    // Reserved fixture tasks belong to alice, who is also a potential owner.
    let record = task_at(TaskStatus::Reserved);
    let roles = derive_roles(&record, &alice());

    assert!(roles.holds(HumanRole::ActualOwner));
    assert!(roles.holds(HumanRole::PotentialOwner));
    assert!(!roles.holds(HumanRole::BusinessAdministrator));
}

#[rstest]
fn business_administrator_derives_from_set_membership() {
    let record = task_at(TaskStatus::Ready);
    let roles = derive_roles(&record, &mia());

    assert_eq!(roles.as_slice(), [HumanRole::BusinessAdministrator]);
}

#[rstest]
fn excluded_owner_loses_potential_owner_role() {
    let record = task_at(TaskStatus::Ready).with_excluded_owners([bob()]);
    let roles = derive_roles(&record, &bob());

    assert!(roles.holds(HumanRole::ExcludedOwner));
    assert!(!roles.holds(HumanRole::PotentialOwner));
}

#[rstest]
fn stranger_derives_no_roles() {
    let record = task_at(TaskStatus::Ready);
    let roles = derive_roles(&record, &stranger());

    assert!(roles.as_slice().is_empty());
    assert!(!roles.holds_any(&[
        HumanRole::TaskInitiator,
        HumanRole::PotentialOwner,
        HumanRole::ActualOwner,
        HumanRole::BusinessAdministrator,
    ]));
}

#[rstest]
fn stakeholder_recipient_and_delegatee_sets_each_grant_their_role() {
    let record = task_at(TaskStatus::Ready)
        .with_stakeholders([stranger()])
        .with_recipients([stranger()])
        .with_potential_delegatees([stranger()]);
    let roles = derive_roles(&record, &stranger());

    assert!(roles.holds(HumanRole::TaskStakeholder));
    assert!(roles.holds(HumanRole::Recipient));
    assert!(roles.holds(HumanRole::PotentialDelegatee));
}

#[rstest]
fn group_membership_is_by_identity_not_expansion() {
    // The engine only compares identities; directory group expansion is the
    // identity source's concern.
    let support = group("support");
    let record = task_at(TaskStatus::Ready).with_potential_owners([support.clone()]);

    assert!(derive_roles(&record, &support).holds(HumanRole::PotentialOwner));
    assert!(!derive_roles(&record, &alice()).holds(HumanRole::PotentialOwner));
}

#[rstest]
fn principal_reflects_record_at_resolution_time() {
    let record = task_at(TaskStatus::Ready);
    let before = TaskPrincipal::resolve(&record, stranger());
    assert!(!before.has_role(HumanRole::PotentialOwner));

    let widened = record.with_potential_owners([stranger()]);
    let after = TaskPrincipal::resolve(&widened, stranger());
    assert!(after.has_role(HumanRole::PotentialOwner));
}

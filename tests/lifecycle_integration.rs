//! End-to-end lifecycle scenarios exercised through the public API only.

use humantask::adapters::memory::{InMemoryHistorySink, InMemoryTaskRepository};
use humantask::domain::{
    LifecycleError, OrgEntity, StateMachine, TaskPriority, TaskRecord, TaskStatus,
};
use humantask::services::{HumanTaskError, HumanTaskService};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::sync::Arc;

type Service = HumanTaskService<
    InMemoryTaskRepository,
    InMemoryHistorySink,
    StateMachine<DefaultClock>,
    DefaultClock,
>;

#[fixture]
fn service() -> Service {
    let clock = Arc::new(DefaultClock);
    HumanTaskService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(InMemoryHistorySink::new()),
        Arc::new(StateMachine::new(Arc::clone(&clock))),
        clock,
    )
}

fn user(name: &str) -> OrgEntity {
    OrgEntity::user(name).expect("valid user name")
}

fn onboarding_task() -> TaskRecord {
    TaskRecord::new("Onboard new vendor", user("ivan"), &DefaultClock)
        .expect("valid task name")
        .with_potential_owners([user("alice"), user("bob")])
        .with_business_administrators([user("mia")])
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn claim_start_suspend_resume_complete(service: Service) {
    let admin = user("mia");
    let worker = user("alice");
    let id = service
        .create(onboarding_task())
        .await
        .expect("create")
        .id();

    service.activate(id, &admin).await.expect("activate");
    service.claim(id, &worker).await.expect("claim");
    service.start(id, &worker).await.expect("start");

    let suspended = service.suspend(id, &worker).await.expect("suspend");
    assert_eq!(suspended.status(), TaskStatus::Suspended);
    let snapshot = suspended.suspended_state().expect("snapshot");
    assert_eq!(snapshot.original_status, TaskStatus::InProgress);
    assert_eq!(snapshot.original_owner, Some(worker.clone()));

    let resumed = service.resume(id, &admin).await.expect("resume");
    assert_eq!(resumed.status(), TaskStatus::InProgress);
    assert!(resumed.suspended_state().is_none());

    let completed = service.complete(id, &worker).await.expect("complete");
    assert_eq!(completed.status(), TaskStatus::Completed);

    let labels: Vec<String> = service
        .history(id)
        .await
        .expect("history")
        .into_iter()
        .map(|event| event.event)
        .collect();
    assert_eq!(
        labels,
        vec!["create", "activate", "claim", "start", "suspend", "resume", "complete"]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn forwarding_reopens_the_task_for_the_target(service: Service) {
    let admin = user("mia");
    let worker = user("alice");
    let target = user("carol");
    let id = service
        .create(onboarding_task())
        .await
        .expect("create")
        .id();

    service.activate(id, &admin).await.expect("activate");
    service.claim(id, &worker).await.expect("claim");

    let forwarded = service
        .forward(id, &worker, target.clone())
        .await
        .expect("forward");

    // Forwarding re-affirms Ready even from Reserved.
    assert_eq!(forwarded.status(), TaskStatus::Ready);
    assert_eq!(forwarded.actual_owner(), Some(&target));
    assert!(forwarded.potential_owners().contains(&target));

    let group = OrgEntity::group("support").expect("valid group name");
    let rejected = service.forward(id, &admin, group).await;
    assert!(matches!(
        rejected,
        Err(HumanTaskError::Lifecycle(LifecycleError::GroupActualOwner(_)))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn nominate_routes_around_explicit_claiming(service: Service) {
    let admin = user("mia");
    let nominee = user("carol");
    let id = service
        .create(onboarding_task())
        .await
        .expect("create")
        .id();

    let nominated = service
        .nominate(id, &admin, nominee.clone())
        .await
        .expect("nominate");

    assert_eq!(nominated.status(), TaskStatus::Reserved);
    assert_eq!(nominated.actual_owner(), Some(&nominee));
    assert!(nominated.potential_owners().contains(&nominee));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn skip_completes_a_skippable_task_from_any_state(service: Service) {
    let initiator = user("ivan");
    let record = onboarding_task().with_skippable(true);
    let id = service.create(record).await.expect("create").id();

    let skipped = service.skip(id, &initiator).await.expect("skip");

    assert_eq!(skipped.status(), TaskStatus::Completed);
    assert!(skipped.completed_at().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delegation_reassigns_priority_and_owner(service: Service) {
    let admin = user("mia");
    let worker = user("alice");
    let delegatee = user("dan");
    let record = onboarding_task().with_priority(TaskPriority::Low);
    let id = service.create(record).await.expect("create").id();

    service.activate(id, &admin).await.expect("activate");
    service.claim(id, &worker).await.expect("claim");
    service.start(id, &worker).await.expect("start");

    let delegated = service
        .delegate(id, &worker, delegatee.clone(), TaskPriority::Critical)
        .await
        .expect("delegate");

    assert_eq!(delegated.status(), TaskStatus::Reserved);
    assert_eq!(delegated.actual_owner(), Some(&delegatee));
    assert_eq!(delegated.priority(), TaskPriority::Critical);
}

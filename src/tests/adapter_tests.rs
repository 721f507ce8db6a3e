//! Tests for the in-memory repository and history sink adapters.

use super::fixtures::{alice, bob, created_task, ivan, mia};
use crate::adapters::memory::{InMemoryHistorySink, InMemoryTaskRepository};
use crate::domain::{TaskHistoryEvent, TaskPriority, TaskRecord, TaskStatus};
use crate::ports::{TaskHistorySink, TaskRepository, TaskRepositoryError};
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};

#[fixture]
fn repository() -> InMemoryTaskRepository {
    InMemoryTaskRepository::new()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_then_find_round_trips(repository: InMemoryTaskRepository) {
    let task = created_task();

    repository.store(&task).await.expect("store");
    let found = repository.find_by_id(task.id()).await.expect("find");

    assert_eq!(found, Some(task));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_rejects_duplicate_identifiers(repository: InMemoryTaskRepository) {
    let task = created_task();
    repository.store(&task).await.expect("store");

    let result = repository.store(&task).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_rejects_unknown_tasks(repository: InMemoryTaskRepository) {
    let task = created_task();

    let result = repository.update(&task, 0).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::NotFound(id)) if id == task.id()
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_detects_a_lost_race_as_stale_version(repository: InMemoryTaskRepository) {
    let task = created_task();
    repository.store(&task).await.expect("store");

    // A competing writer commits version 1 first.
    let mut winner = task.clone();
    winner.bump_version();
    repository.update(&winner, 0).await.expect("first commit");

    // The reader of version 0 now loses its commit.
    let mut loser = task.clone();
    loser.bump_version();
    let result = repository.update(&loser, 0).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::StaleVersion {
            expected: 0,
            stored: 1,
            ..
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_subtasks_returns_only_direct_children(repository: InMemoryTaskRepository) {
    let parent = created_task();
    let child_a = TaskRecord::new("Collect receipts", ivan(), &DefaultClock)
        .expect("valid name")
        .with_parent(parent.id())
        .with_potential_owners([alice()]);
    let child_b = TaskRecord::new("Scan invoices", ivan(), &DefaultClock)
        .expect("valid name")
        .with_parent(parent.id())
        .with_potential_owners([bob()]);
    let unrelated = created_task();

    repository.store(&parent).await.expect("store parent");
    repository.store(&child_a).await.expect("store child a");
    repository.store(&child_b).await.expect("store child b");
    repository.store(&unrelated).await.expect("store unrelated");

    let subtasks = repository.find_subtasks(parent.id()).await.expect("find");
    let ids: Vec<_> = subtasks.iter().map(TaskRecord::id).collect();

    assert_eq!(ids, vec![child_a.id(), child_b.id()]);
    let none = repository
        .find_subtasks(unrelated.id())
        .await
        .expect("find");
    assert!(none.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn history_sink_replays_events_in_append_order() {
    let sink = InMemoryHistorySink::new();
    let task = created_task();
    let make_event = |label: &str, old: TaskStatus, new: TaskStatus| TaskHistoryEvent {
        task_id: task.id(),
        event: label.to_owned(),
        old_status: old,
        new_status: new,
        old_priority: TaskPriority::Normal,
        new_priority: TaskPriority::Normal,
        start_owner: None,
        end_owner: None,
        actor: mia(),
        occurred_at: DefaultClock.utc(),
    };

    sink.append(make_event("create", TaskStatus::Created, TaskStatus::Created))
        .await
        .expect("append");
    sink.append(make_event("activate", TaskStatus::Created, TaskStatus::Ready))
        .await
        .expect("append");

    let events = sink.history(task.id()).await.expect("history");
    let labels: Vec<&str> = events.iter().map(|event| event.event.as_str()).collect();
    assert_eq!(labels, vec!["create", "activate"]);

    let other = sink.history(created_task().id()).await.expect("history");
    assert!(other.is_empty());
}

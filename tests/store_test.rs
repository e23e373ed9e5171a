//! Backend parity tests.
//!
//! Both `TaskStore` implementations must satisfy the same contract through
//! the manager, so every shared check runs once per backend. Backend-specific
//! behavior (id retirement, reopen persistence, file layout) is tested at the
//! bottom.

use std::sync::Arc;

use taskd::storage::{json::JsonFileStore, SqliteStore, TaskStore};
use taskd::tasks::{Category, NewTaskInput, TaskError, TaskManager, TaskPatch};
use tempfile::TempDir;

async fn sqlite_manager(dir: &TempDir) -> TaskManager {
    let store = SqliteStore::open(dir.path()).await.unwrap();
    TaskManager::new(Arc::new(store))
}

async fn json_manager(dir: &TempDir) -> TaskManager {
    let store = JsonFileStore::open(dir.path()).await.unwrap();
    TaskManager::new(Arc::new(store))
}

fn new_task(description: &str, category: Option<&str>, deadline: Option<&str>) -> NewTaskInput {
    NewTaskInput {
        description: Some(description.to_string()),
        category: category.map(str::to_string),
        deadline: deadline.map(str::to_string),
    }
}

// ─── Shared contract ──────────────────────────────────────────────────────────

async fn check_create_basics(manager: &TaskManager) {
    let first = manager
        .add_task(new_task("T1", Some("Personal"), Some("2025-12-30")))
        .await
        .unwrap();
    assert!(first.id > 0);
    assert!(!first.completed);
    assert_eq!(first.description, "T1");
    assert_eq!(first.category, Some(Category::Personal));
    assert_eq!(first.deadline, "2025-12-30".parse().ok());

    let second = manager.add_task(new_task("T2", None, None)).await.unwrap();
    assert!(second.id > 0);
    assert_ne!(first.id, second.id);
    assert_eq!(second.category, None);
    assert_eq!(second.deadline, None);
}

async fn check_validation(manager: &TaskManager) {
    let err = manager.add_task(NewTaskInput::default()).await.unwrap_err();
    match err {
        TaskError::Validation(msg) => assert_eq!(msg, "Description is required"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let err = manager
        .add_task(NewTaskInput {
            description: Some(String::new()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::Validation(_)));

    let err = manager
        .add_task(new_task("read a book", Some("Lazer"), None))
        .await
        .unwrap_err();
    match err {
        TaskError::Validation(msg) => assert_eq!(msg, "Categoria inválida"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let err = manager
        .add_task(new_task("bad date", None, Some("30/12/2025")))
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::Validation(_)));

    // Nothing got persisted along the way.
    assert!(manager.get_tasks(None).await.unwrap().is_empty());
}

async fn check_complete_idempotent(manager: &TaskManager) {
    let task = manager.add_task(new_task("T1", None, None)).await.unwrap();

    let done = manager.mark_completed(task.id).await.unwrap();
    assert!(done.completed);

    let done_again = manager.mark_completed(task.id).await.unwrap();
    assert!(done_again.completed);
    assert_eq!(done_again.id, task.id);

    let err = manager.mark_completed(999).await.unwrap_err();
    assert!(matches!(err, TaskError::NotFound));
}

async fn check_delete(manager: &TaskManager) {
    // Deleting an id that never existed is a no-op, not an error.
    manager.delete_task(999).await.unwrap();

    let task = manager.add_task(new_task("T1", None, None)).await.unwrap();
    manager.delete_task(task.id).await.unwrap();
    assert!(manager.get_tasks(None).await.unwrap().is_empty());

    // A deleted id stays dead for complete/edit.
    let err = manager.mark_completed(task.id).await.unwrap_err();
    assert!(matches!(err, TaskError::NotFound));

    // Deleting it again is still fine.
    manager.delete_task(task.id).await.unwrap();
}

async fn check_edit(manager: &TaskManager) {
    let task = manager
        .add_task(new_task("T1", Some("Work"), Some("2025-12-30")))
        .await
        .unwrap();

    // Unknown category is dropped silently; the rest of the patch applies.
    let edited = manager
        .edit_task(
            task.id,
            TaskPatch {
                description: Some("T1 edited".to_string()),
                category: Some("Lazer".to_string()),
                deadline: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.description, "T1 edited");
    assert_eq!(edited.category, Some(Category::Work));
    assert_eq!(edited.deadline, "2025-12-30".parse().ok());

    // A valid category does change it; empty strings count as absent.
    let edited = manager
        .edit_task(
            task.id,
            TaskPatch {
                description: Some(String::new()),
                category: Some("Health".to_string()),
                deadline: Some("2026-01-15".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.description, "T1 edited");
    assert_eq!(edited.category, Some(Category::Health));
    assert_eq!(edited.deadline, "2026-01-15".parse().ok());

    // The stored record matches what edit returned.
    let listed = manager.get_tasks(None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].category, Some(Category::Health));

    let err = manager
        .edit_task(999, TaskPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::NotFound));

    let err = manager
        .edit_task(
            task.id,
            TaskPatch {
                deadline: Some("not-a-date".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::Validation(_)));
}

async fn check_filter_partition(manager: &TaskManager) {
    for i in 0..4 {
        manager
            .add_task(new_task(&format!("task {i}"), None, None))
            .await
            .unwrap();
    }
    let all = manager.get_tasks(None).await.unwrap();
    manager.mark_completed(all[0].id).await.unwrap();
    manager.mark_completed(all[2].id).await.unwrap();

    let pending = manager.get_tasks(Some(false)).await.unwrap();
    let completed = manager.get_tasks(Some(true)).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(completed.len(), 2);
    assert!(pending.iter().all(|t| !t.completed));
    assert!(completed.iter().all(|t| t.completed));

    // pending ∪ completed == all, pending ∩ completed == ∅
    let mut ids: Vec<i64> = pending
        .iter()
        .chain(completed.iter())
        .map(|t| t.id)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), all.len());
}

async fn check_delete_all(manager: &TaskManager) {
    // Clearing an already-empty store succeeds.
    manager.delete_all().await.unwrap();
    assert!(manager.get_tasks(None).await.unwrap().is_empty());

    manager.add_task(new_task("T1", None, None)).await.unwrap();
    manager.add_task(new_task("T2", None, None)).await.unwrap();
    manager.delete_all().await.unwrap();
    assert!(manager.get_tasks(None).await.unwrap().is_empty());
}

async fn check_deadline_ordering(manager: &TaskManager) {
    manager
        .add_task(new_task("late", None, Some("2025-12-31")))
        .await
        .unwrap();
    manager.add_task(new_task("undated", None, None)).await.unwrap();
    manager
        .add_task(new_task("early", None, Some("2025-01-01")))
        .await
        .unwrap();

    let tasks = manager.get_tasks(None).await.unwrap();
    let order: Vec<&str> = tasks.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(order, ["undated", "early", "late"]);
}

macro_rules! parity_tests {
    ($($name:ident => $check:ident),* $(,)?) => {
        mod sqlite {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    let dir = TempDir::new().unwrap();
                    let manager = sqlite_manager(&dir).await;
                    $check(&manager).await;
                }
            )*
        }
        mod json {
            use super::*;
            $(
                #[tokio::test]
                async fn $name() {
                    let dir = TempDir::new().unwrap();
                    let manager = json_manager(&dir).await;
                    $check(&manager).await;
                }
            )*
        }
    };
}

parity_tests! {
    create_basics => check_create_basics,
    validation => check_validation,
    complete_idempotent => check_complete_idempotent,
    delete => check_delete,
    edit => check_edit,
    filter_partition => check_filter_partition,
    delete_all => check_delete_all,
    deadline_ordering => check_deadline_ordering,
}

// ─── Backend-specific ─────────────────────────────────────────────────────────

#[tokio::test]
async fn json_ids_are_never_reused_after_delete() {
    let dir = TempDir::new().unwrap();
    let manager = json_manager(&dir).await;

    let first = manager.add_task(new_task("a", None, None)).await.unwrap();
    let second = manager.add_task(new_task("b", None, None)).await.unwrap();
    assert_eq!((first.id, second.id), (1, 2));

    manager.delete_task(second.id).await.unwrap();
    let third = manager.add_task(new_task("c", None, None)).await.unwrap();
    assert_eq!(third.id, 3);

    manager.delete_task(first.id).await.unwrap();
    manager.delete_task(third.id).await.unwrap();
    let fourth = manager.add_task(new_task("d", None, None)).await.unwrap();
    assert_eq!(fourth.id, 4);
}

#[tokio::test]
async fn json_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let manager = json_manager(&dir).await;
        manager.add_task(new_task("a", None, None)).await.unwrap();
        let b = manager.add_task(new_task("b", None, None)).await.unwrap();
        manager.mark_completed(b.id).await.unwrap();
    }

    let manager = json_manager(&dir).await;
    let tasks = manager.get_tasks(None).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().any(|t| t.completed));

    // The id counter resumes past everything on disk.
    let next = manager.add_task(new_task("c", None, None)).await.unwrap();
    assert_eq!(next.id, 3);
}

#[tokio::test]
async fn json_file_layout_is_a_plain_array_without_created_at() {
    let dir = TempDir::new().unwrap();
    let manager = json_manager(&dir).await;
    manager
        .add_task(new_task("a", Some("Home"), Some("2025-12-30")))
        .await
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("tasks.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], 1);
    assert_eq!(entries[0]["description"], "a");
    assert_eq!(entries[0]["category"], "Home");
    assert_eq!(entries[0]["deadline"], "2025-12-30");
    assert_eq!(entries[0]["completed"], false);
    assert!(entries[0].get("created_at").is_none());
}

#[tokio::test]
async fn json_open_rejects_a_malformed_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tasks.json"), "{ not json").unwrap();
    assert!(JsonFileStore::open(dir.path()).await.is_err());
}

#[tokio::test]
async fn sqlite_state_survives_reopen_and_keeps_created_at() {
    let dir = TempDir::new().unwrap();
    {
        let manager = sqlite_manager(&dir).await;
        let task = manager.add_task(new_task("a", None, None)).await.unwrap();
        assert!(task.created_at.is_some());
    }

    let manager = sqlite_manager(&dir).await;
    let tasks = manager.get_tasks(None).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].created_at.is_some());
}

#[tokio::test]
async fn sqlite_ids_are_never_reused_after_delete() {
    let dir = TempDir::new().unwrap();
    let manager = sqlite_manager(&dir).await;

    let first = manager.add_task(new_task("a", None, None)).await.unwrap();
    let second = manager.add_task(new_task("b", None, None)).await.unwrap();
    manager.delete_task(second.id).await.unwrap();
    let third = manager.add_task(new_task("c", None, None)).await.unwrap();
    assert!(third.id > second.id);
    assert_ne!(third.id, first.id);
}

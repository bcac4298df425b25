// End-to-end behaviour of the task store through its public API

use checklist::storage::{TASKS_KEY, USER_TASKS_KEY};
use checklist::{Config, FileStorage, KeyValueStorage, MemoryStorage, Task, TaskStore};
use tempfile::TempDir;

fn empty_store() -> TaskStore<MemoryStorage> {
    let mut storage = MemoryStorage::new();
    storage.set(TASKS_KEY, "[]").unwrap();
    storage.set(USER_TASKS_KEY, "[]").unwrap();
    TaskStore::new(storage).unwrap()
}

fn registry_is_consistent<S: KeyValueStorage>(store: &TaskStore<S>) -> bool {
    store.user_task_ids().iter().all(|id| store.task(*id).is_some())
}

#[test]
fn add_toggle_undo_scenario() {
    let mut store = empty_store();

    let t1 = store.add_task("Buy milk").unwrap();
    let pending: Vec<Task> = store.get_pending_tasks().into_iter().cloned().collect();
    assert_eq!(pending, vec![Task::new(t1, "Buy milk")]);

    store.toggle_task_complete(t1).unwrap();
    let completed = store.get_completed_tasks();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, t1);
    assert!(completed[0].completed);
    assert!(store.get_pending_tasks().is_empty());

    assert!(store.undo_last_action().unwrap());
    let pending = store.get_pending_tasks();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, t1);
    assert!(!pending[0].completed);
}

#[test]
fn new_tasks_are_prepended_and_reorder_moves_them() {
    let mut store = empty_store();
    let a = store.add_task("a").unwrap();
    let b = store.add_task("b").unwrap();

    let order: Vec<_> = store.tasks().iter().map(|t| t.id).collect();
    assert_eq!(order, vec![b, a]);

    store.reorder_tasks(1, 0).unwrap();
    let order: Vec<_> = store.tasks().iter().map(|t| t.id).collect();
    assert_eq!(order, vec![a, b]);
}

#[test]
fn long_text_is_clamped() {
    let mut store = empty_store();
    let id = store.add_task(&"x".repeat(100)).unwrap();
    assert_eq!(store.task(id).unwrap().text.chars().count(), 80);
}

#[test]
fn delete_last_user_task_with_only_defaults() {
    let mut store = TaskStore::new(MemoryStorage::new()).unwrap();
    let before = store.tasks().to_vec();

    assert!(!store.delete_last_user_task().unwrap());
    assert_eq!(store.tasks(), before.as_slice());
    assert!(!store.history().can_undo());
}

#[test]
fn delete_last_user_task_removes_most_recent() {
    let mut store = empty_store();
    let first = store.add_task("first").unwrap();
    store.add_task("second").unwrap();

    assert!(store.delete_last_user_task().unwrap());
    assert!(store.delete_last_user_task().unwrap());
    assert!(store.task(first).is_none());
    assert!(!store.delete_last_user_task().unwrap());
}

#[test]
fn toggle_is_idempotent_in_pairs() {
    let mut store = TaskStore::new(MemoryStorage::new()).unwrap();
    let original = store.tasks().to_vec();

    for task in &original {
        store.toggle_task_complete(task.id).unwrap();
        store.toggle_task_complete(task.id).unwrap();
    }
    assert_eq!(store.tasks(), original.as_slice());
}

#[test]
fn task_collection_json_roundtrip() {
    let mut store = TaskStore::new(MemoryStorage::new()).unwrap();
    let id = store.add_task("Round trip").unwrap();
    store.toggle_task_complete(id).unwrap();

    let json = serde_json::to_string(store.tasks()).unwrap();
    let parsed: Vec<Task> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.as_slice(), store.tasks());
}

#[test]
fn registry_stays_consistent_through_adds_and_deletes() {
    let mut store = TaskStore::new(MemoryStorage::new()).unwrap();
    let mut ids = Vec::new();

    for n in 0..6 {
        ids.push(store.add_task(&format!("task {}", n)).unwrap());
        assert!(registry_is_consistent(&store));
    }
    store.delete_task(ids[2]).unwrap();
    store.delete_task(1).unwrap(); // a seed task
    store.delete_last_user_task().unwrap();
    store.delete_completed_tasks().unwrap();
    assert!(registry_is_consistent(&store));

    store.undo_last_action().unwrap();
    store.undo_last_action().unwrap();
    assert!(registry_is_consistent(&store));
    store.redo_action().unwrap();
    assert!(registry_is_consistent(&store));

    store.delete_all_tasks().unwrap();
    assert!(store.user_task_ids().is_empty());
}

#[test]
fn history_keeps_only_ten_entries() {
    let mut store = empty_store();
    let id = store.add_task("v0").unwrap();
    for n in 1..15 {
        store.edit_task(id, &format!("v{}", n)).unwrap();
    }
    assert_eq!(store.history().undo_depth(), 10);

    let mut undone = 0;
    while store.undo_last_action().unwrap() {
        undone += 1;
    }
    assert_eq!(undone, 10);
    // Oldest reachable state is the one before the fifth edit
    assert_eq!(store.task(id).unwrap().text, "v4");
    assert_eq!(store.history().redo_depth(), 10);
}

#[test]
fn fresh_action_invalidates_redo() {
    let mut store = empty_store();
    let id = store.add_task("start").unwrap();

    store.edit_task(id, "A").unwrap();
    store.edit_task(id, "B").unwrap();
    assert!(store.undo_last_action().unwrap());
    assert_eq!(store.task(id).unwrap().text, "A");

    store.edit_task(id, "C").unwrap();
    assert!(!store.redo_action().unwrap());
    assert_eq!(store.task(id).unwrap().text, "C");
}

#[test]
fn corrupt_files_fall_back_to_defaults() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("checklist-tasks.json"), "[{\"id\":").unwrap();
    std::fs::write(temp.path().join("checklist-user-tasks.json"), "oops").unwrap();

    let store = TaskStore::new(FileStorage::open(temp.path()).unwrap()).unwrap();
    assert_eq!(store.tasks().len(), 3);
    assert!(store.tasks().iter().all(Task::is_default));
    assert!(store.user_task_ids().is_empty());

    // The fallback is written back over the corrupt data
    let content = std::fs::read_to_string(temp.path().join("checklist-tasks.json")).unwrap();
    let parsed: Vec<Task> = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.len(), 3);
}

#[test]
fn stored_layout_matches_expected_json() {
    let temp = TempDir::new().unwrap();
    let config = Config {
        data_dir: Some(temp.path().to_path_buf()),
        ..Config::default()
    };
    let mut store = TaskStore::open(config.open_storage().unwrap(), &config).unwrap();
    store.delete_all_tasks().unwrap();
    let id = store.add_task("Buy milk").unwrap();

    let tasks = std::fs::read_to_string(temp.path().join("checklist-tasks.json")).unwrap();
    assert_eq!(
        tasks,
        format!(r#"[{{"id":{},"text":"Buy milk","completed":false}}]"#, id)
    );
    let user = std::fs::read_to_string(temp.path().join("checklist-user-tasks.json")).unwrap();
    assert_eq!(user, format!("[{}]", id));
}

#[test]
fn independent_stores_do_not_share_state() {
    let mut one = empty_store();
    let two = empty_store();

    one.add_task("only in one").unwrap();
    assert_eq!(one.tasks().len(), 1);
    assert!(two.tasks().is_empty());
}

// Presentation-side helpers: shortcut table, drag-and-drop resolution, edit validation
//
// None of these hold state. They translate user input into calls on the
// task store.

use crate::filter::StatusFilter;
use crate::storage::KeyValueStorage;
use crate::store::TaskStore;
use crate::task::{Task, TaskId};

/// Text given to tasks created through the new-task shortcut
pub const NEW_TASK_TEXT: &str = "New task";

/// A user-level command the front end can dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NewTask,
    Undo,
    Redo,
    ShowFilter(StatusFilter),
    DeleteAll,
}

/// Map a key press to a command. Only Ctrl+Alt chords are bound.
pub fn shortcut(ctrl: bool, alt: bool, key: char) -> Option<Command> {
    if !ctrl || !alt {
        return None;
    }
    match key.to_ascii_lowercase() {
        'n' => Some(Command::NewTask),
        'z' => Some(Command::Undo),
        'y' => Some(Command::Redo),
        'c' => Some(Command::ShowFilter(StatusFilter::Pending)),
        'f' => Some(Command::ShowFilter(StatusFilter::Completed)),
        'r' => Some(Command::DeleteAll),
        _ => None,
    }
}

/// Where a dragged task was released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Another row, by position in the filtered view
    Task(usize),
    Trash,
}

/// Store call resulting from a drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropAction {
    /// Full-collection indices for `reorder_tasks`
    Reorder { from: usize, to: usize },
    Delete(TaskId),
    None,
}

/// Rows can only be dragged while no search term is active
pub fn drag_enabled(search_term: &str) -> bool {
    search_term.trim().is_empty()
}

/// Translate a drop expressed in view positions into a store call.
///
/// `view` is the filtered list the user sees. Positions are mapped to the
/// full collection by id, so the store only ever sees full-collection
/// indices.
pub fn resolve_drop<S: KeyValueStorage>(
    view: &[&Task],
    store: &TaskStore<S>,
    dragged: usize,
    target: DropTarget,
) -> DropAction {
    let Some(dragged_task) = view.get(dragged) else {
        return DropAction::None;
    };

    match target {
        DropTarget::Trash => DropAction::Delete(dragged_task.id),
        DropTarget::Task(dropped) if dropped == dragged => DropAction::None,
        DropTarget::Task(dropped) => {
            let Some(target_task) = view.get(dropped) else {
                return DropAction::None;
            };
            match (store.position(dragged_task.id), store.position(target_task.id)) {
                (Some(from), Some(to)) => DropAction::Reorder { from, to },
                _ => DropAction::None,
            }
        }
    }
}

/// Result of validating an inline edit before committing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Commit(String),
    Unchanged,
    Empty,
    /// Rejected; the input exceeds the limit by `over` characters
    TooLong { over: usize },
}

/// Check edited text. Over-length input is refused rather than clamped so
/// the UI can flag it.
pub fn validate_edit(current: &str, input: &str, max_chars: usize) -> EditOutcome {
    let len = input.chars().count();
    if len > max_chars {
        return EditOutcome::TooLong { over: len - max_chars };
    }

    let trimmed = input.trim();
    if trimmed.is_empty() {
        EditOutcome::Empty
    } else if trimmed == current {
        EditOutcome::Unchanged
    } else {
        EditOutcome::Commit(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, TASKS_KEY};

    fn store() -> TaskStore<MemoryStorage> {
        let tasks = vec![
            Task::new(1, "one"),
            Task {
                completed: true,
                ..Task::new(2, "two")
            },
            Task::new(3, "three"),
            Task::new(4, "four"),
        ];
        let mut storage = MemoryStorage::new();
        storage.set(TASKS_KEY, &serde_json::to_string(&tasks).unwrap()).unwrap();
        TaskStore::new(storage).unwrap()
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(shortcut(true, true, 'n'), Some(Command::NewTask));
        assert_eq!(shortcut(true, true, 'Z'), Some(Command::Undo));
        assert_eq!(shortcut(true, true, 'y'), Some(Command::Redo));
        assert_eq!(
            shortcut(true, true, 'c'),
            Some(Command::ShowFilter(StatusFilter::Pending))
        );
        assert_eq!(
            shortcut(true, true, 'f'),
            Some(Command::ShowFilter(StatusFilter::Completed))
        );
        assert_eq!(shortcut(true, true, 'r'), Some(Command::DeleteAll));
        assert_eq!(shortcut(true, true, 'q'), None);
        assert_eq!(shortcut(true, false, 'n'), None);
        assert_eq!(shortcut(false, true, 'n'), None);
    }

    #[test]
    fn test_resolve_drop_maps_view_to_full_indices() {
        let store = store();
        // Pending view hides task 2
        let view = store.get_pending_tasks();

        // Drag "four" (view 2) onto "one" (view 0)
        assert_eq!(
            resolve_drop(&view, &store, 2, DropTarget::Task(0)),
            DropAction::Reorder { from: 3, to: 0 }
        );
        // Drag "one" onto "three" (view 1, full 2)
        assert_eq!(
            resolve_drop(&view, &store, 0, DropTarget::Task(1)),
            DropAction::Reorder { from: 0, to: 2 }
        );
    }

    #[test]
    fn test_resolve_drop_then_reorder() {
        let mut store = store();
        let action = {
            let view = store.get_pending_tasks();
            resolve_drop(&view, &store, 2, DropTarget::Task(0))
        };
        let DropAction::Reorder { from, to } = action else {
            panic!("expected a reorder, got {:?}", action);
        };
        store.reorder_tasks(from, to).unwrap();

        let ids: Vec<TaskId> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 1, 2, 3]);
    }

    #[test]
    fn test_resolve_drop_edge_cases() {
        let store = store();
        let view = store.get_filtered_tasks(StatusFilter::All, "");

        assert_eq!(resolve_drop(&view, &store, 1, DropTarget::Task(1)), DropAction::None);
        assert_eq!(resolve_drop(&view, &store, 9, DropTarget::Task(0)), DropAction::None);
        assert_eq!(resolve_drop(&view, &store, 0, DropTarget::Task(9)), DropAction::None);
        assert_eq!(resolve_drop(&view, &store, 1, DropTarget::Trash), DropAction::Delete(2));
    }

    #[test]
    fn test_drag_enabled() {
        assert!(drag_enabled(""));
        assert!(drag_enabled("   "));
        assert!(!drag_enabled("milk"));
    }

    #[test]
    fn test_validate_edit() {
        assert_eq!(
            validate_edit("old", "  new  ", 80),
            EditOutcome::Commit("new".to_string())
        );
        assert_eq!(validate_edit("old", "old ", 80), EditOutcome::Unchanged);
        assert_eq!(validate_edit("old", "   ", 80), EditOutcome::Empty);
        assert_eq!(
            validate_edit("old", &"x".repeat(85), 80),
            EditOutcome::TooLong { over: 5 }
        );
    }
}

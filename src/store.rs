// Task store: owns the task collection, the user-created registry and history

use crate::config::Config;
use crate::filter::{StatusFilter, TaskQuery};
use crate::history::{Action, History, HistoryEntry};
use crate::storage::{self, KeyValueStorage, TASKS_KEY, USER_TASKS_KEY};
use crate::task::{IdGenerator, Task, TaskId, clamp_text, default_tasks};
use eyre::{Context, Result, eyre};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// State container for the checklist.
///
/// Every mutation is written through to `storage` before the call returns.
/// All mutations except undo and redo record the prior state in history and
/// clear the redo stack.
pub struct TaskStore<S: KeyValueStorage> {
    storage: S,
    tasks: Arc<Vec<Task>>,
    /// Ids of tasks added through `add_task`, most recent first
    user_tasks: Arc<Vec<TaskId>>,
    history: History,
    ids: IdGenerator,
    max_chars: usize,
}

impl<S: KeyValueStorage> TaskStore<S> {
    /// Open a store over `storage` with default settings
    pub fn new(storage: S) -> Result<Self> {
        Self::open(storage, &Config::default())
    }

    /// Load persisted state from `storage`, seeding defaults when absent.
    ///
    /// Corrupt stored data is logged and replaced, never returned as an error.
    pub fn open(storage: S, config: &Config) -> Result<Self> {
        config.validate()?;

        let tasks: Vec<Task> = storage::load_json(&storage, TASKS_KEY).unwrap_or_else(|| {
            info!("No stored tasks, seeding defaults");
            default_tasks()
        });
        let mut user_tasks: Vec<TaskId> = storage::load_json(&storage, USER_TASKS_KEY).unwrap_or_default();

        // Registry entries must point at existing tasks
        let before = user_tasks.len();
        user_tasks.retain(|id| tasks.iter().any(|t| t.id == *id));
        if user_tasks.len() != before {
            warn!(
                dropped = before - user_tasks.len(),
                "Dropped user task ids with no matching task"
            );
        }

        let mut store = Self {
            ids: IdGenerator::seeded_from(&tasks),
            storage,
            tasks: Arc::new(tasks),
            user_tasks: Arc::new(user_tasks),
            history: History::with_limit(config.history_limit),
            max_chars: config.max_chars,
        };
        let (tasks, user_tasks) = (Arc::clone(&store.tasks), Arc::clone(&store.user_tasks));
        store.write_state(&tasks, &user_tasks)?;

        debug!(
            tasks = store.tasks.len(),
            user_tasks = store.user_tasks.len(),
            "Opened task store"
        );
        Ok(store)
    }

    // ========================================================================
    // Read-only views
    // ========================================================================

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn user_task_ids(&self) -> &[TaskId] {
        &self.user_tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Position of a task within the full collection
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Tasks matching a status filter and search term, in collection order
    pub fn get_filtered_tasks(&self, filter: StatusFilter, search_term: &str) -> Vec<&Task> {
        self.query(&TaskQuery::new(filter, search_term))
    }

    pub fn query(&self, query: &TaskQuery) -> Vec<&Task> {
        self.tasks.iter().filter(|t| query.matches(t)).collect()
    }

    pub fn get_pending_tasks(&self) -> Vec<&Task> {
        self.get_filtered_tasks(StatusFilter::Pending, "")
    }

    pub fn get_completed_tasks(&self) -> Vec<&Task> {
        self.get_filtered_tasks(StatusFilter::Completed, "")
    }

    /// (pending, completed)
    pub fn counts(&self) -> (usize, usize) {
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        (self.tasks.len() - completed, completed)
    }

    // ========================================================================
    // Commands
    //
    // Each command builds the next collections, writes them, and only then
    // records history and swaps them in. A failed write leaves memory and
    // history as they were.
    // ========================================================================

    /// Add a task at the front of the collection and return its id
    pub fn add_task(&mut self, text: &str) -> Result<TaskId> {
        let mut ids = self.ids.clone();
        let task = Task::new(ids.next_id()?, clamp_text(text, self.max_chars));
        let id = task.id;

        let mut tasks = Vec::clone(&self.tasks);
        tasks.insert(0, task);
        let mut user_tasks = Vec::clone(&self.user_tasks);
        user_tasks.insert(0, id);

        self.commit(Action::AddTask, tasks, user_tasks)?;
        self.ids = ids;

        debug!(id, "add_task");
        Ok(id)
    }

    /// Remove a task and its registry entry; unknown ids still record history
    pub fn delete_task(&mut self, id: TaskId) -> Result<()> {
        let task = self.task(id).cloned();

        let mut tasks = Vec::clone(&self.tasks);
        tasks.retain(|t| t.id != id);
        let mut user_tasks = Vec::clone(&self.user_tasks);
        user_tasks.retain(|uid| *uid != id);

        self.commit(Action::DeleteTask { task }, tasks, user_tasks)?;
        debug!(id, "delete_task");
        Ok(())
    }

    /// Delete the most recently added user task.
    ///
    /// Returns false without touching state or history when there is none.
    pub fn delete_last_user_task(&mut self) -> Result<bool> {
        let Some(&id) = self.user_tasks.first() else {
            return Ok(false);
        };
        self.delete_task(id)?;
        Ok(true)
    }

    pub fn delete_all_tasks(&mut self) -> Result<()> {
        self.commit(Action::DeleteAll, Vec::new(), Vec::new())?;
        debug!("delete_all_tasks");
        Ok(())
    }

    /// Delete every completed task as one undoable action; returns how many
    pub fn delete_completed_tasks(&mut self) -> Result<usize> {
        let (_, count) = self.counts();
        if count == 0 {
            return Ok(0);
        }

        let removed: Vec<TaskId> = self.tasks.iter().filter(|t| t.completed).map(|t| t.id).collect();
        let tasks: Vec<Task> = self.tasks.iter().filter(|t| !t.completed).cloned().collect();
        let user_tasks: Vec<TaskId> = self
            .user_tasks
            .iter()
            .copied()
            .filter(|id| !removed.contains(id))
            .collect();

        self.commit(Action::DeleteCompleted { count }, tasks, user_tasks)?;
        debug!(count, "delete_completed_tasks");
        Ok(count)
    }

    pub fn toggle_task_complete(&mut self, id: TaskId) -> Result<()> {
        let previous_completed = self.task(id).map(|t| t.completed);

        let mut tasks = Vec::clone(&self.tasks);
        if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
            task.completed = !task.completed;
        }
        let user_tasks = Vec::clone(&self.user_tasks);

        self.commit(Action::ToggleComplete { id, previous_completed }, tasks, user_tasks)?;
        debug!(id, ?previous_completed, "toggle_task_complete");
        Ok(())
    }

    pub fn edit_task(&mut self, id: TaskId, new_text: &str) -> Result<()> {
        let previous_text = self.task(id).map(|t| t.text.clone());

        let mut tasks = Vec::clone(&self.tasks);
        if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
            task.text = clamp_text(new_text, self.max_chars);
        }
        let user_tasks = Vec::clone(&self.user_tasks);

        self.commit(Action::EditTask { id, previous_text }, tasks, user_tasks)?;
        debug!(id, "edit_task");
        Ok(())
    }

    /// Move the task at `from` so that it ends up at `to`.
    ///
    /// Both indices address the full collection; `to` is interpreted after
    /// the task has been removed. Out-of-range indices are rejected.
    pub fn reorder_tasks(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.tasks.len();
        if from >= len || to >= len {
            return Err(eyre!("Reorder index out of range: {} -> {} (len {})", from, to, len));
        }

        let mut tasks = Vec::clone(&self.tasks);
        let task = tasks.remove(from);
        tasks.insert(to, task);
        let user_tasks = Vec::clone(&self.user_tasks);

        self.commit(Action::Reorder { from, to }, tasks, user_tasks)?;
        debug!(from, to, "reorder_tasks");
        Ok(())
    }

    /// Restore the state before the last recorded action
    pub fn undo_last_action(&mut self) -> Result<bool> {
        let Some(entry) = self.history.pop_undo() else {
            return Ok(false);
        };

        if let Err(e) = self.write_state(&entry.tasks, &entry.user_tasks) {
            self.history.push_undo(entry);
            return Err(e);
        }

        let current = HistoryEntry::new(entry.action.clone(), &self.tasks, &self.user_tasks);
        self.history.push_redo(current);
        self.restore(entry);

        info!(undo = self.history.undo_depth(), redo = self.history.redo_depth(), "Undid last action");
        Ok(true)
    }

    /// Reapply the last undone action
    pub fn redo_action(&mut self) -> Result<bool> {
        let Some(entry) = self.history.pop_redo() else {
            return Ok(false);
        };

        if let Err(e) = self.write_state(&entry.tasks, &entry.user_tasks) {
            self.history.push_redo(entry);
            return Err(e);
        }

        let current = HistoryEntry::new(entry.action.clone(), &self.tasks, &self.user_tasks);
        self.history.push_undo(current);
        self.restore(entry);

        info!(undo = self.history.undo_depth(), redo = self.history.redo_depth(), "Redid action");
        Ok(true)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    /// Persist the next state, then record the current one and swap
    fn commit(&mut self, action: Action, tasks: Vec<Task>, user_tasks: Vec<TaskId>) -> Result<()> {
        self.write_state(&tasks, &user_tasks)?;

        self.history
            .record(HistoryEntry::new(action, &self.tasks, &self.user_tasks));
        self.tasks = Arc::new(tasks);
        self.user_tasks = Arc::new(user_tasks);
        Ok(())
    }

    fn restore(&mut self, entry: HistoryEntry) {
        self.tasks = entry.tasks;
        self.user_tasks = entry.user_tasks;
    }

    /// Write both keys. If the second write fails the first is rolled back
    /// to the in-memory state, so the stored keys keep agreeing.
    fn write_state(&mut self, tasks: &[Task], user_tasks: &[TaskId]) -> Result<()> {
        let tasks_json = serde_json::to_string(tasks).context("Failed to serialize tasks")?;
        let user_json = serde_json::to_string(user_tasks).context("Failed to serialize user tasks")?;

        self.storage.set(TASKS_KEY, &tasks_json).context("Failed to persist tasks")?;

        if let Err(e) = self.storage.set(USER_TASKS_KEY, &user_json) {
            let previous = serde_json::to_string(&*self.tasks).context("Failed to serialize tasks")?;
            if let Err(rollback) = self.storage.set(TASKS_KEY, &previous) {
                warn!(error = ?rollback, "Failed to roll back stored tasks");
            }
            return Err(e).context("Failed to persist user tasks");
        }
        Ok(())
    }
}

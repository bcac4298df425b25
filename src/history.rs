// Bounded undo/redo history of task-collection snapshots

use crate::task::{Task, TaskId};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of entries each stack retains
pub const HISTORY_LIMIT: usize = 10;

/// What a history entry was recorded for, plus what the action overwrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddTask,
    DeleteTask { task: Option<Task> },
    DeleteAll,
    DeleteCompleted { count: usize },
    ToggleComplete { id: TaskId, previous_completed: Option<bool> },
    EditTask { id: TaskId, previous_text: Option<String> },
    Reorder { from: usize, to: usize },
}

impl Action {
    pub fn tag(&self) -> &'static str {
        match self {
            Action::AddTask => "ADD_TASK",
            Action::DeleteTask { .. } => "DELETE_TASK",
            Action::DeleteAll => "DELETE_ALL",
            Action::DeleteCompleted { .. } => "DELETE_COMPLETED",
            Action::ToggleComplete { .. } => "TOGGLE_COMPLETE",
            Action::EditTask { .. } => "EDIT_TASK",
            Action::Reorder { .. } => "REORDER",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Checkpoint of both persisted collections.
///
/// The collections are `Arc`s shared with the store, so taking a snapshot
/// never copies tasks.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub action: Action,
    pub tasks: Arc<Vec<Task>>,
    pub user_tasks: Arc<Vec<TaskId>>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(action: Action, tasks: &Arc<Vec<Task>>, user_tasks: &Arc<Vec<TaskId>>) -> Self {
        Self {
            action,
            tasks: Arc::clone(tasks),
            user_tasks: Arc::clone(user_tasks),
            timestamp: Utc::now(),
        }
    }
}

/// Undo and redo stacks, most recent entry at the front
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    limit: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(limit + 1),
            redo_stack: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    /// Record the state before a fresh mutation.
    ///
    /// Any new action invalidates the redo history.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.push_undo(entry);
        self.redo_stack.clear();
    }

    /// Push onto the undo stack without touching redo (used by redo)
    pub fn push_undo(&mut self, entry: HistoryEntry) {
        Self::push_bounded(&mut self.undo_stack, entry, self.limit);
    }

    /// Push onto the redo stack (used by undo)
    pub fn push_redo(&mut self, entry: HistoryEntry) {
        Self::push_bounded(&mut self.redo_stack, entry, self.limit);
    }

    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.undo_stack.pop_front()
    }

    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        self.redo_stack.pop_front()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Undo entries, most recent first
    pub fn undo_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo_stack.iter()
    }

    /// Redo entries, most recent first
    pub fn redo_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.redo_stack.iter()
    }

    fn push_bounded(stack: &mut VecDeque<HistoryEntry>, entry: HistoryEntry, limit: usize) {
        stack.push_front(entry);
        stack.truncate(limit);
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

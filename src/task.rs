// Task model and id generation

use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};

/// Identifier of a task, serialized as a plain JSON number
pub type TaskId = i64;

/// Default maximum length of a task's text, in characters
pub const MAX_CHARS: usize = 80;

/// A single checklist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    /// Set on the seed tasks written at first load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl Task {
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            is_default: None,
        }
    }

    pub fn is_default(&self) -> bool {
        self.is_default.unwrap_or(false)
    }
}

/// Truncate `text` to at most `max` characters without splitting a char
pub fn clamp_text(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Seed tasks used when nothing has been persisted yet
pub fn default_tasks() -> Vec<Task> {
    let seed = |id, text: &str, completed| Task {
        id,
        text: text.to_string(),
        completed,
        is_default: Some(true),
    };

    vec![
        seed(1, "Create your first task", false),
        seed(2, "Edit a task by clicking on its text", false),
        seed(3, "Save the world... and finish the project", true),
    ]
}

/// Hands out task ids based on the wall clock, never repeating one.
///
/// Two tasks added within the same millisecond get consecutive ids instead
/// of colliding.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: TaskId,
}

impl IdGenerator {
    /// Start above every id in `tasks`
    pub fn seeded_from(tasks: &[Task]) -> Self {
        Self {
            last: tasks.iter().map(|t| t.id).max().unwrap_or(0),
        }
    }

    /// Fails only once the id space is exhausted
    pub fn next_id(&mut self) -> Result<TaskId> {
        let after_last = self
            .last
            .checked_add(1)
            .ok_or_else(|| eyre!("Task id space exhausted (last id {})", self.last))?;
        let id = now_ms().max(after_last);
        self.last = id;
        Ok(id)
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

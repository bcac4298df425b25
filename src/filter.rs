// Status and search filtering over tasks

use crate::task::Task;
use std::convert::Infallible;
use std::str::FromStr;

/// View selector over the task collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    Pending,
    Completed,
    #[default]
    All,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
            StatusFilter::All => true,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Infallible;

    /// Anything other than "pending" or "completed" means no status filtering
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => StatusFilter::Pending,
            "completed" => StatusFilter::Completed,
            _ => StatusFilter::All,
        })
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::Pending => write!(f, "pending"),
            StatusFilter::Completed => write!(f, "completed"),
            StatusFilter::All => write!(f, "all"),
        }
    }
}

/// Status filter combined with a case-insensitive search term
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub status: StatusFilter,
    /// Stored lowercased; empty matches everything
    search: String,
}

impl TaskQuery {
    pub fn new(status: StatusFilter, search: &str) -> Self {
        Self {
            status,
            search: search.to_lowercase(),
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task) && (self.search.is_empty() || task.text.to_lowercase().contains(&self.search))
    }
}

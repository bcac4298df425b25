// Checklist - task store with bounded undo/redo and key-value persistence

pub mod collab;
pub mod config;
pub mod filter;
pub mod history;
pub mod storage;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use config::{Config, StorageKind};
pub use filter::{StatusFilter, TaskQuery};
pub use history::{Action, History, HistoryEntry};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, SqliteStorage};
pub use store::TaskStore;
pub use task::{Task, TaskId, now_ms};

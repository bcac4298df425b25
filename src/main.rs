use checklist::collab::{self, Command, DropAction, DropTarget, EditOutcome, NEW_TASK_TEXT};
use checklist::{Config, KeyValueStorage, StatusFilter, Task, TaskId, TaskStore};
use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "checklist")]
#[command(about = "Checklist CLI - tasks with undo/redo, persisted locally")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the data directory from the config
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Op(Op),

    /// Interactive session; undo/redo history lives for its duration
    Shell,
}

/// Commands available both one-shot and inside the shell
#[derive(Subcommand)]
enum Op {
    /// List tasks
    List {
        /// pending, completed, or anything else for all
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Case-insensitive text search
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Add a task at the top of the list
    Add { text: Vec<String> },

    /// Replace a task's text
    Edit { id: TaskId, text: Vec<String> },

    /// Flip a task between pending and completed
    Toggle { id: TaskId },

    /// Delete a task
    Delete { id: TaskId },

    /// Delete the most recently added task
    DeleteLast,

    /// Delete all completed tasks
    DeleteCompleted,

    /// Delete every task
    Clear,

    /// Move a task between positions in the full list
    Move { from: usize, to: usize },
}

#[derive(Parser)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Op(Op),

    /// Undo the last action
    Undo,

    /// Redo the last undone action
    Redo,

    /// Show the undo history
    History,

    /// Switch the current view filter
    Filter { name: String },

    /// Set the current search term (empty clears it)
    Search { term: Vec<String> },

    /// Press Ctrl+Alt+<key>
    Key { key: char },

    /// Drag a row of the current view onto another row or "trash"
    Drop { from: usize, target: String },

    /// Leave the shell
    Quit,
}

/// What the user is looking at between commands
struct Session<S: KeyValueStorage> {
    store: TaskStore<S>,
    filter: StatusFilter,
    search: String,
}

impl<S: KeyValueStorage> Session<S> {
    fn new(store: TaskStore<S>) -> Self {
        Self {
            store,
            filter: StatusFilter::Pending,
            search: String::new(),
        }
    }

    fn run_op(&mut self, op: Op) -> Result<()> {
        match op {
            Op::List { filter, search } => {
                let filter: StatusFilter = filter.parse()?;
                let tasks = self.store.get_filtered_tasks(filter, &search);
                print_tasks(&tasks);
                print_counts(self.store.counts());
            }
            Op::Add { text } => {
                let id = self.store.add_task(&text.join(" "))?;
                // New tasks are pending, show them
                self.filter = StatusFilter::Pending;
                println!("Added task {}", id.to_string().bold());
            }
            Op::Edit { id, text } => {
                let current = self
                    .store
                    .task(id)
                    .map(|t| t.text.clone())
                    .ok_or_else(|| eyre!("No task with id {}", id))?;
                match collab::validate_edit(&current, &text.join(" "), self.store.max_chars()) {
                    EditOutcome::Commit(text) => {
                        self.store.edit_task(id, &text)?;
                        println!("Edited task {}", id);
                    }
                    EditOutcome::Unchanged => println!("Text unchanged"),
                    EditOutcome::Empty => println!("{}", "Task text cannot be empty".yellow()),
                    EditOutcome::TooLong { over } => println!(
                        "{}",
                        format!("Too long by {} characters (max {})", over, self.store.max_chars()).red()
                    ),
                }
            }
            Op::Toggle { id } => {
                self.store.toggle_task_complete(id)?;
                match self.store.task(id) {
                    Some(task) if task.completed => println!("Completed task {}", id),
                    Some(_) => println!("Reopened task {}", id),
                    None => println!("No task with id {}", id),
                }
            }
            Op::Delete { id } => {
                self.store.delete_task(id)?;
                println!("Deleted task {}", id);
            }
            Op::DeleteLast => {
                if self.store.delete_last_user_task()? {
                    println!("Deleted most recent task");
                } else {
                    println!("No user-created tasks to delete");
                }
            }
            Op::DeleteCompleted => {
                let count = self.store.delete_completed_tasks()?;
                println!("Deleted {} completed task(s)", count);
            }
            Op::Clear => {
                self.store.delete_all_tasks()?;
                println!("Deleted all tasks");
            }
            Op::Move { from, to } => {
                self.store.reorder_tasks(from, to)?;
                println!("Moved task from {} to {}", from, to);
            }
        }
        Ok(())
    }

    /// Returns false when the shell should exit
    fn run_shell_command(&mut self, command: ShellCommand) -> Result<bool> {
        match command {
            ShellCommand::Op(op) => self.run_op(op)?,
            ShellCommand::Undo => self.dispatch(Command::Undo)?,
            ShellCommand::Redo => self.dispatch(Command::Redo)?,
            ShellCommand::History => {
                for (n, entry) in self.store.history().undo_entries().enumerate() {
                    println!(
                        "{:>2}. {} {}",
                        n + 1,
                        entry.action.tag().cyan(),
                        entry.timestamp.format("%H:%M:%S").to_string().dimmed()
                    );
                }
                for entry in self.store.history().redo_entries() {
                    println!(
                        "  redo {} {}",
                        entry.action.tag().dimmed(),
                        entry.timestamp.format("%H:%M:%S").to_string().dimmed()
                    );
                }
                println!(
                    "{} undo, {} redo",
                    self.store.history().undo_depth(),
                    self.store.history().redo_depth()
                );
            }
            ShellCommand::Filter { name } => self.filter = name.parse()?,
            ShellCommand::Search { term } => self.search = term.join(" "),
            ShellCommand::Key { key } => match collab::shortcut(true, true, key) {
                Some(command) => self.dispatch(command)?,
                None => println!("Ctrl+Alt+{} is not bound", key),
            },
            ShellCommand::Drop { from, target } => {
                if !collab::drag_enabled(&self.search) {
                    println!("{}", "Dragging is disabled while searching".yellow());
                    return Ok(true);
                }
                let target = if target == "trash" {
                    DropTarget::Trash
                } else {
                    DropTarget::Task(target.parse()?)
                };
                let action = {
                    let view = self.store.get_filtered_tasks(self.filter, &self.search);
                    collab::resolve_drop(&view, &self.store, from, target)
                };
                match action {
                    DropAction::Reorder { from, to } => self.store.reorder_tasks(from, to)?,
                    DropAction::Delete(id) => self.store.delete_task(id)?,
                    DropAction::None => {}
                }
            }
            ShellCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::NewTask => {
                self.filter = StatusFilter::Pending;
                self.store.add_task(NEW_TASK_TEXT)?;
            }
            Command::Undo => {
                if !self.store.undo_last_action()? {
                    println!("Nothing to undo");
                }
            }
            Command::Redo => {
                if !self.store.redo_action()? {
                    println!("Nothing to redo");
                }
            }
            Command::ShowFilter(filter) => self.filter = filter,
            Command::DeleteAll => self.store.delete_all_tasks()?,
        }
        Ok(())
    }

    fn shell(&mut self) -> Result<()> {
        let stdin = io::stdin();
        loop {
            println!();
            println!("{} {}", "view:".dimmed(), self.filter);
            print_tasks(&self.store.get_filtered_tasks(self.filter, &self.search));
            print_counts(self.store.counts());

            print!("{} ", ">".bold());
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Ok(());
            }
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }

            let command = match ShellLine::try_parse_from(words) {
                Ok(parsed) => parsed.command,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };

            match self.run_shell_command(command) {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) => println!("{} {:#}", "error:".red(), e),
            }
        }
    }
}

fn print_tasks(tasks: &[&Task]) {
    if tasks.is_empty() {
        println!("{}", "No tasks to show".dimmed());
        return;
    }
    for (index, task) in tasks.iter().enumerate() {
        let check = if task.completed { "[x]".green() } else { "[ ]".normal() };
        let text = if task.completed {
            task.text.strikethrough().dimmed()
        } else {
            task.text.normal()
        };
        println!("{:>3} {} {} {}", index, check, text, format!("#{}", task.id).dimmed());
    }
}

fn print_counts((pending, completed): (usize, usize)) {
    println!("{} pending, {} completed", pending.to_string().bold(), completed);
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = Some(data_dir);
    }

    // Open store
    let storage = config.open_storage()?;
    let store = TaskStore::open(storage, &config)?;
    let mut session = Session::new(store);

    match cli.command {
        Commands::Op(op) => session.run_op(op)?,
        Commands::Shell => session.shell()?,
    }

    Ok(())
}

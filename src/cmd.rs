//! Command implementations for the CLI interface.
//!
//! Each handler resolves the identifiers it was given, calls the stores and
//! prints the outcome. Handlers return errors instead of exiting so `main`
//! decides how to report them.

use chrono::Utc;
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::board::Board;
use crate::display::*;
use crate::error::Result;
use crate::prio_list::Prio;
use crate::priority::PriorityPatch;
use crate::storage::Storage;
use crate::task::{NewTask, TaskPatch};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Priority: high | medium | low, or a priority ID (prefix).
        #[arg(long, short)]
        priority: Option<String>,
        /// Category ID.
        #[arg(long)]
        category: Option<String>,
    },

    /// List tasks: open before done, then by priority, newest first.
    List {
        /// Hide completed tasks.
        #[arg(long)]
        open: bool,
    },

    /// Show a single task.
    Show {
        /// Task ID or unique prefix.
        id: String,
    },

    /// Update fields on a task.
    Update {
        /// Task ID or unique prefix.
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// New description; an empty string clears it.
        #[arg(long)]
        desc: Option<String>,
        /// Priority: high | medium | low, or a priority ID (prefix).
        #[arg(long, short)]
        priority: Option<String>,
        #[arg(long, conflicts_with = "clear_category")]
        category: Option<String>,
        #[arg(long)]
        clear_category: bool,
        /// Mark done.
        #[arg(long, conflicts_with = "undone")]
        done: bool,
        /// Mark not done.
        #[arg(long)]
        undone: bool,
    },

    /// Mark a task done.
    Done {
        /// Task ID or unique prefix.
        id: String,
    },

    /// Reopen a completed task.
    Reopen {
        /// Task ID or unique prefix.
        id: String,
    },

    /// Delete a task.
    Remove {
        /// Task ID or unique prefix.
        id: String,
    },

    /// Delete every task and the stored task record.
    Clear,

    /// Manage priority definitions.
    Prio {
        #[command(subcommand)]
        action: PrioAction,
    },

    /// Manage the CSV priority list.
    Csv {
        #[command(subcommand)]
        action: CsvAction,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum PrioAction {
    /// List priorities by order.
    List,
    /// Create a priority.
    Add {
        name: String,
        /// Display color, e.g. "#fde68a".
        #[arg(long)]
        color: Option<String>,
        /// Sort order; lower is more urgent. Defaults to after the last one.
        #[arg(long, allow_hyphen_values = true)]
        order: Option<i64>,
    },
    /// Change a priority.
    Update {
        /// Priority ID or unique prefix.
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        order: Option<i64>,
    },
    /// Delete a priority. Tasks using it become unranked.
    Remove {
        /// Priority ID or unique prefix.
        id: String,
    },
}

#[derive(Subcommand)]
pub enum CsvAction {
    /// List rows in stored order.
    List,
    /// Append a row. Keys are not required to be unique.
    Add {
        key: String,
        label: String,
        #[arg(allow_hyphen_values = true)]
        weight: i64,
    },
    /// Remove every row with this key.
    Remove { key: String },
}

/// Run one command against an opened board.
pub fn run<S: Storage + Clone>(board: &mut Board<S>, command: Commands) -> Result<()> {
    match command {
        Commands::Add { title, desc, priority, category } => cmd_add(board, title, desc, priority, category),
        Commands::List { open } => {
            cmd_list(board, open);
            Ok(())
        }
        Commands::Show { id } => cmd_show(board, &id),
        Commands::Update { id, title, desc, priority, category, clear_category, done, undone } => {
            let category = if clear_category { Some(None) } else { category.map(Some) };
            let done = if done {
                Some(true)
            } else if undone {
                Some(false)
            } else {
                None
            };
            cmd_update(board, &id, title, desc, priority, category, done)
        }
        Commands::Done { id } => cmd_set_done(board, &id, true),
        Commands::Reopen { id } => cmd_set_done(board, &id, false),
        Commands::Remove { id } => cmd_remove(board, &id),
        Commands::Clear => cmd_clear(board),
        Commands::Prio { action } => cmd_prio(board, action),
        Commands::Csv { action } => cmd_csv(board, action),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

/// Add a new task.
pub fn cmd_add<S: Storage + Clone>(
    board: &mut Board<S>,
    title: String,
    desc: Option<String>,
    priority: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let priority_ref = priority.map(|p| board.resolve_priority(&p)).transpose()?;
    let id = board.tasks.add(NewTask {
        title,
        description: desc,
        priority_ref,
        category_id: category,
    })?;
    println!("Added task {}", short_id(&id));
    Ok(())
}

/// Print the derived task view.
pub fn cmd_list<S: Storage + Clone>(board: &Board<S>, open_only: bool) {
    print!("{}", render_task_table(board, open_only, Utc::now()));
}

/// Print every field of one task.
pub fn cmd_show<S: Storage + Clone>(board: &Board<S>, needle: &str) -> Result<()> {
    let id = board.resolve_task(needle)?;
    if let Some(t) = board.tasks.get(&id) {
        print!("{}", render_task_detail(board, &id, t));
    }
    Ok(())
}

/// Update fields on a task.
pub fn cmd_update<S: Storage + Clone>(
    board: &mut Board<S>,
    needle: &str,
    title: Option<String>,
    desc: Option<String>,
    priority: Option<String>,
    category: Option<Option<String>>,
    done: Option<bool>,
) -> Result<()> {
    let id = board.resolve_task(needle)?;
    let priority_ref = priority.map(|p| board.resolve_priority(&p)).transpose()?;
    board.tasks.update(
        &id,
        TaskPatch {
            title,
            description: desc,
            done,
            priority_ref,
            category_id: category,
        },
    )?;
    println!("Updated {}", short_id(&id));
    Ok(())
}

/// Mark a task done or open.
pub fn cmd_set_done<S: Storage + Clone>(board: &mut Board<S>, needle: &str, done: bool) -> Result<()> {
    let id = board.resolve_task(needle)?;
    board.tasks.update(
        &id,
        TaskPatch {
            done: Some(done),
            ..TaskPatch::default()
        },
    )?;
    if done {
        println!("Marked done.");
    } else {
        println!("Reopened {}", short_id(&id));
    }
    Ok(())
}

/// Delete one task.
pub fn cmd_remove<S: Storage + Clone>(board: &mut Board<S>, needle: &str) -> Result<()> {
    let id = board.resolve_task(needle)?;
    board.tasks.remove(&id)?;
    println!("Deleted.");
    Ok(())
}

/// Delete all tasks.
pub fn cmd_clear<S: Storage + Clone>(board: &mut Board<S>) -> Result<()> {
    let count = board.tasks.len();
    board.tasks.clear_all()?;
    println!("Deleted {count} task(s).");
    Ok(())
}

/// Handle priority management commands.
pub fn cmd_prio<S: Storage + Clone>(board: &mut Board<S>, action: PrioAction) -> Result<()> {
    match action {
        PrioAction::List => print!("{}", render_priorities(&board.priorities.list())),
        PrioAction::Add { name, color, order } => {
            let id = board.priorities.add(&name, color, order)?;
            println!("Added priority {}", short_id(&id));
        }
        PrioAction::Update { id, name, color, order } => {
            let id = board.resolve_priority(&id)?;
            board.priorities.update(&id, PriorityPatch { name, color, order })?;
            println!("Updated priority {}", short_id(&id));
        }
        PrioAction::Remove { id } => {
            let id = board.resolve_priority(&id)?;
            board.remove_priority(&id)?;
            println!("Deleted priority.");
        }
    }
    Ok(())
}

/// Handle CSV priority list commands.
pub fn cmd_csv<S: Storage + Clone>(board: &mut Board<S>, action: CsvAction) -> Result<()> {
    match action {
        CsvAction::List => print!("{}", render_prio_list(board.prio_list.list())),
        CsvAction::Add { key, label, weight } => {
            board.prio_list.add(Prio { key, label, weight })?;
            println!("Added.");
        }
        CsvAction::Remove { key } => {
            board.prio_list.remove(&key)?;
            println!("Removed.");
        }
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

//! # prioboard
//!
//! A local task board: tasks carry a priority, priorities are user-defined, and
//! everything is persisted as plain text values in a key/value storage medium
//! (one file per key in the data directory).
//!
//! ## Key Features
//!
//! - **Task store**: create, edit, complete and delete tasks; every change is
//!   written immediately.
//! - **Priority store**: named, colored priorities with a sort order, seeded
//!   with high/medium/low on first use.
//! - **CSV priority list**: the simpler key/label/weight priority workflow.
//! - **Derived view**: tasks always listed open-first, then by priority weight,
//!   then most recently updated.
//! - **Migration**: tasks saved with the old numeric priority level (1/2/3) are
//!   mapped to the default priorities when loaded.
//!
//! ## Storage keys
//!
//! - `tasks_dict_v1`: JSON object of task id -> task
//! - `priorities_dict_v1`: JSON object of priority id -> priority
//! - `priorities_csv`: CSV with a `key,label,weight` header
//!
//! ## Example
//!
//! ```
//! use prioboard::{Board, MemoryStorage, NewTask};
//!
//! let mut board = Board::open(MemoryStorage::new());
//! let high = board.tasks.defaults().high.clone();
//! board.tasks.add(NewTask::new("later")).unwrap();
//! board.tasks.add(NewTask::new("now").priority(high)).unwrap();
//!
//! let titles: Vec<_> = board
//!     .tasks
//!     .entries(&board.priorities)
//!     .into_iter()
//!     .map(|(_, t)| t.title.as_str())
//!     .collect();
//! assert_eq!(titles, ["now", "later"]);
//! ```

pub mod board;
pub mod cli;
pub mod cmd;
pub mod codec;
pub mod config;
pub mod display;
pub mod error;
pub mod fields;
pub mod prio_list;
pub mod priority;
pub mod storage;
pub mod store;
pub mod task;
pub mod view;

pub use board::Board;
pub use error::{Error, Result};
pub use prio_list::{Prio, PrioList};
pub use priority::{DefaultPriorityIds, Priority, PriorityPatch, PriorityStore};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::TaskStore;
pub use task::{NewTask, Task, TaskPatch};
pub use view::PriorityLookup;

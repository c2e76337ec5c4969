//! The task store: owns the id -> task mapping and persists it on every change.
//!
//! Loading runs the migration pass once, before any query: default priorities
//! are ensured, every record is normalized, and tasks without a resolvable
//! priority reference are assigned one. Migration does not write back; the
//! next mutation persists the migrated mapping.
//!
//! Every mutator writes the whole mapping synchronously. When that write fails
//! the error is returned, but the in-memory mapping keeps the change; the next
//! successful write persists it, since each write is a full snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::codec::{Codec, JsonMapCodec};
use crate::error::{Error, Result};
use crate::priority::{new_id, DefaultPriorityIds, PriorityStore};
use crate::storage::{read_or_absent, Storage};
use crate::task::{trimmed_optional, NewTask, StoredTask, Task, TaskPatch};
use crate::view::{sorted_entries, PriorityLookup};

/// Storage key of the task mapping.
pub const TASKS_KEY: &str = "tasks_dict_v1";

/// Store owning the task mapping.
#[derive(Debug)]
pub struct TaskStore<S: Storage> {
    storage: S,
    codec: JsonMapCodec<Task>,
    tasks: BTreeMap<String, Task>,
    defaults: DefaultPriorityIds,
    editing: Option<String>,
}

impl<S: Storage> TaskStore<S> {
    /// Load and migrate the task mapping. Never fails: unreadable or malformed
    /// payloads are logged and the store starts empty.
    pub fn load<P: Storage>(storage: S, priorities: &mut PriorityStore<P>) -> Self {
        let defaults = match priorities.ensure_defaults() {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "could not persist default priorities");
                priorities.default_ids()
            }
        };

        let raw = read_or_absent(&storage, TASKS_KEY);
        let stored = JsonMapCodec::<StoredTask>::new().decode(raw.as_deref());
        let now = Utc::now();
        let mut migrated = 0usize;
        let tasks: BTreeMap<String, Task> = stored
            .into_iter()
            .map(|(id, record)| {
                let (task, was_migrated) = record.normalize(&defaults, |r| priorities.contains(r), now);
                if was_migrated {
                    migrated += 1;
                }
                (id, task)
            })
            .collect();
        if migrated > 0 {
            info!(migrated, "assigned default priorities to tasks without a resolvable reference");
        }
        debug!(tasks = tasks.len(), "loaded tasks");

        Self {
            storage,
            codec: JsonMapCodec::new(),
            tasks,
            defaults,
            editing: None,
        }
    }

    /// Create a task and return its id.
    ///
    /// Rejects a title that is empty after trimming. Without an explicit
    /// priority the task gets the current medium default (see
    /// [`TaskStore::set_defaults`]).
    pub fn add(&mut self, input: NewTask) -> Result<String> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(Error::EmptyTitle);
        }
        let mut id = new_id();
        while self.tasks.contains_key(&id) {
            id = new_id();
        }
        let task = Task {
            title: title.to_string(),
            description: input.description.as_deref().and_then(trimmed_optional),
            done: false,
            priority_ref: Some(input.priority_ref.unwrap_or_else(|| self.defaults.medium.clone())),
            legacy_priority_level: None,
            category_id: input.category_id,
            updated_at: Utc::now(),
        };
        self.tasks.insert(id.clone(), task);
        self.save()?;
        Ok(id)
    }

    /// Merge `patch` into task `id` and refresh its timestamp.
    ///
    /// Unknown ids are ignored without touching anything. A patch whose title
    /// trims to empty is rejected.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<()> {
        if let Some(title) = &patch.title {
            if self.tasks.contains_key(id) && title.trim().is_empty() {
                return Err(Error::EmptyTitle);
            }
        }
        let Some(task) = self.tasks.get_mut(id) else {
            return Ok(());
        };
        let stamp = next_stamp(task.updated_at);
        task.apply(patch, stamp);
        self.save()
    }

    /// Flip the done flag of task `id`.
    pub fn toggle_done(&mut self, id: &str) -> Result<()> {
        let Some(done) = self.tasks.get(id).map(|t| t.done) else {
            return Ok(());
        };
        self.update(
            id,
            TaskPatch {
                done: Some(!done),
                ..TaskPatch::default()
            },
        )
    }

    /// Delete task `id` if present. Clears the editing target when it pointed there.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        self.tasks.remove(id);
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        self.save()
    }

    /// Drop every task and delete the stored record entirely.
    pub fn clear_all(&mut self) -> Result<()> {
        self.tasks.clear();
        self.editing = None;
        self.storage.remove_item(TASKS_KEY)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Track which task the UI is editing. Not persisted.
    pub fn set_editing(&mut self, id: Option<String>) {
        self.editing = id;
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Tasks in display order, resolved against `priorities`.
    pub fn entries<'a, L: PriorityLookup + ?Sized>(&'a self, priorities: &L) -> Vec<(&'a String, &'a Task)> {
        sorted_entries(&self.tasks, priorities)
    }

    /// Tasks in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Task)> {
        self.tasks.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.tasks.keys()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Priorities standing in for high, medium and low.
    pub fn defaults(&self) -> &DefaultPriorityIds {
        &self.defaults
    }

    /// Replace the default priority ids, e.g. after one of them was removed.
    /// Existing tasks keep their references.
    pub fn set_defaults(&mut self, defaults: DefaultPriorityIds) {
        self.defaults = defaults;
    }

    fn save(&self) -> Result<()> {
        let encoded = self.codec.encode(&self.tasks)?;
        self.storage.set_item(TASKS_KEY, &encoded)
    }
}

/// A timestamp strictly after `previous`, normally the current time.
fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::nanoseconds(1)
    }
}

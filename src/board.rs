//! The board: both priority stores and the task store, opened together over
//! one storage medium.
//!
//! The board is constructed once at startup and handed to whatever drives it
//! (the CLI, tests). It also resolves the short identifiers people type.

use tracing::debug;

use crate::error::{Error, Result};
use crate::fields::DefaultSlot;
use crate::prio_list::PrioList;
use crate::priority::PriorityStore;
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::task::Task;

pub struct Board<S: Storage + Clone> {
    pub priorities: PriorityStore<S>,
    pub tasks: TaskStore<S>,
    pub prio_list: PrioList<S>,
}

impl<S: Storage + Clone> Board<S> {
    /// Load every store from `storage`, running the task migration.
    pub fn open(storage: S) -> Self {
        let mut priorities = PriorityStore::load(storage.clone());
        let tasks = TaskStore::load(storage.clone(), &mut priorities);
        let prio_list = PrioList::load(storage);
        Self {
            priorities,
            tasks,
            prio_list,
        }
    }

    /// Delete priority `id`. When it stood in for one of the defaults, the
    /// defaults are recomputed (reseeding an emptied store) so new tasks never
    /// point at the removed priority.
    pub fn remove_priority(&mut self, id: &str) -> Result<()> {
        self.priorities.remove(id)?;
        let defaults = self.tasks.defaults();
        if [&defaults.high, &defaults.medium, &defaults.low].iter().any(|d| d.as_str() == id) {
            let fresh = self.priorities.ensure_defaults()?;
            debug!(medium = %fresh.medium, "default priorities changed");
            self.tasks.set_defaults(fresh);
        }
        Ok(())
    }

    /// Full id of the task whose id is `needle` or starts with it.
    pub fn resolve_task(&self, needle: &str) -> Result<String> {
        resolve_identifier("task", needle, self.tasks.ids())
    }

    /// Resolve a priority given as `high`/`medium`/`low`, an id or an id prefix.
    pub fn resolve_priority(&self, needle: &str) -> Result<String> {
        if let Some(slot) = DefaultSlot::parse(needle) {
            return Ok(self.tasks.defaults().for_slot(slot).to_string());
        }
        let ids: Vec<String> = self.priorities.list().iter().map(|p| p.id.clone()).collect();
        resolve_identifier("priority", needle, ids.iter())
    }

    /// Display name of the task's priority, or `-` when it does not resolve.
    pub fn priority_label(&self, task: &Task) -> String {
        self.priorities
            .resolve(task.priority_ref.as_deref())
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "-".into())
    }
}

/// Match `needle` against `ids`: an exact match wins, otherwise the needle must
/// be a prefix of exactly one id.
pub fn resolve_identifier<'a, I>(kind: &'static str, needle: &str, ids: I) -> Result<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let needle = needle.trim();
    let mut matches = Vec::new();
    for id in ids {
        if id == needle {
            return Ok(id.clone());
        }
        if !needle.is_empty() && id.starts_with(needle) {
            matches.push(id);
        }
    }
    match matches.len() {
        0 => Err(Error::NotFound {
            kind,
            needle: needle.to_string(),
        }),
        1 => Ok(matches[0].clone()),
        count => Err(Error::Ambiguous {
            kind,
            needle: needle.to_string(),
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::task::NewTask;

    #[test]
    fn test_resolve_identifier() {
        let ids: Vec<String> = ["abc123", "abd456", "zzz"].iter().map(|s| s.to_string()).collect();
        assert_eq!(resolve_identifier("task", "abc", ids.iter()).unwrap(), "abc123");
        assert_eq!(resolve_identifier("task", "zzz", ids.iter()).unwrap(), "zzz");
        assert!(matches!(
            resolve_identifier("task", "ab", ids.iter()),
            Err(Error::Ambiguous { count: 2, .. })
        ));
        assert!(matches!(resolve_identifier("task", "q", ids.iter()), Err(Error::NotFound { .. })));
        assert!(matches!(resolve_identifier("task", "", ids.iter()), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_open_shares_storage() {
        let storage = MemoryStorage::new();
        let mut board = Board::open(storage.clone());
        let id = board.tasks.add(NewTask::new("hello")).unwrap();

        let board = Board::open(storage);
        assert_eq!(board.priorities.len(), 3);
        assert_eq!(board.prio_list.list().len(), 3);
        let short = &id[..6];
        assert_eq!(board.resolve_task(short).unwrap(), id);
        let task = board.tasks.get(&id).unwrap();
        assert_eq!(board.priority_label(task), "Mittel");
    }

    #[test]
    fn test_removing_default_priority_moves_new_tasks() {
        let mut board = Board::open(MemoryStorage::new());
        let old = board.tasks.defaults().clone();
        board.remove_priority(&old.medium).unwrap();

        let defaults = board.tasks.defaults().clone();
        assert_ne!(defaults.medium, old.medium);
        assert!(board.priorities.contains(&defaults.medium));
        let id = board.tasks.add(NewTask::new("after removal")).unwrap();
        let task = board.tasks.get(&id).unwrap();
        assert_eq!(task.priority_ref.as_deref(), Some(defaults.medium.as_str()));
        assert_eq!(board.priority_label(task), "Niedrig");

        board.remove_priority(&defaults.high).unwrap();
        board.remove_priority(&defaults.low).unwrap();
        assert_eq!(board.priorities.len(), 3);
        let reseeded = board.tasks.defaults().medium.clone();
        assert!(board.priorities.contains(&reseeded));
    }

    #[test]
    fn test_removing_other_priority_keeps_defaults() {
        let mut board = Board::open(MemoryStorage::new());
        let before = board.tasks.defaults().clone();
        let extra = board.priorities.add("Extra", None, None).unwrap();
        board.remove_priority(&extra).unwrap();
        assert_eq!(board.tasks.defaults(), &before);
    }

    #[test]
    fn test_resolve_priority_keywords_and_ids() {
        let mut board = Board::open(MemoryStorage::new());
        let high = board.tasks.defaults().high.clone();
        assert_eq!(board.resolve_priority("HIGH").unwrap(), high);
        let extra = board.priorities.add("Extra", None, None).unwrap();
        assert_eq!(board.resolve_priority(&extra).unwrap(), extra);
        assert!(board.resolve_priority("not-a-priority").is_err());
    }
}

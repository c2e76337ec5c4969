//! Derived, always-sorted view of the task mapping.
//!
//! The view has no storage of its own. It is recomputed from the store's
//! current mapping on every read, so it always reflects the latest mutation.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::fields::UNRANKED_WEIGHT;
use crate::task::Task;

/// Resolves a priority reference to its ordering weight.
pub trait PriorityLookup {
    fn weight_of(&self, reference: &str) -> Option<i64>;
}

/// Weight used to sort `task`; unresolved references sort last.
pub fn effective_weight<L: PriorityLookup + ?Sized>(task: &Task, lookup: &L) -> i64 {
    task.priority_ref
        .as_deref()
        .and_then(|r| lookup.weight_of(r))
        .unwrap_or(UNRANKED_WEIGHT)
}

/// Order tasks: open before done, then by priority weight, then most recently
/// updated first. The sort is stable over the mapping's id order.
pub fn sorted_entries<'a, L: PriorityLookup + ?Sized>(
    tasks: &'a BTreeMap<String, Task>,
    lookup: &L,
) -> Vec<(&'a String, &'a Task)> {
    let mut entries: Vec<_> = tasks.iter().collect();
    entries.sort_by_cached_key(|(_, t)| (t.done, effective_weight(t, lookup), Reverse(t.updated_at)));
    entries
}

//! Key-keyed priority list persisted as CSV.
//!
//! This is the simpler priority workflow: a flat list of `(key, label, weight)`
//! rows. Keys are unique by convention only. When a key appears more than
//! once, lookups use the last matching row.

use crate::codec::{Codec, PrioCsvCodec};
use crate::error::Result;
use crate::storage::{read_or_absent, Storage};
use crate::view::PriorityLookup;

/// Storage key of the tabular priority list.
pub const PRIOS_KEY: &str = "priorities_csv";

/// One row of the priority list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prio {
    pub key: String,
    pub label: String,
    pub weight: i64,
}

/// Store for the tabular priority list.
#[derive(Debug)]
pub struct PrioList<S: Storage> {
    storage: S,
    codec: PrioCsvCodec,
    prios: Vec<Prio>,
}

impl<S: Storage> PrioList<S> {
    /// Load the list from storage. Blank or absent storage yields the three
    /// built-in defaults, which are not written back until the next mutation.
    pub fn load(storage: S) -> Self {
        let mut list = Self {
            storage,
            codec: PrioCsvCodec,
            prios: Vec::new(),
        };
        list.reload();
        list
    }

    /// Re-read storage, replacing the in-memory list.
    pub fn reload(&mut self) {
        let raw = read_or_absent(&self.storage, PRIOS_KEY);
        self.prios = self.codec.decode(raw.as_deref());
    }

    /// Rows in stored order.
    pub fn list(&self) -> &[Prio] {
        &self.prios
    }

    /// Last row with `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Prio> {
        self.prios.iter().rev().find(|p| p.key == key)
    }

    /// Append a row. Duplicate keys are accepted.
    pub fn add(&mut self, prio: Prio) -> Result<()> {
        self.prios.push(prio);
        self.save()
    }

    /// Remove every row with `key`. Persists even when nothing matched.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        self.prios.retain(|p| p.key != key);
        self.save()
    }

    fn save(&self) -> Result<()> {
        let encoded = self.codec.encode(&self.prios)?;
        self.storage.set_item(PRIOS_KEY, &encoded)
    }
}

impl<S: Storage> PriorityLookup for PrioList<S> {
    fn weight_of(&self, reference: &str) -> Option<i64> {
        self.get(reference).map(|p| p.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn prio(key: &str, label: &str, weight: i64) -> Prio {
        Prio { key: key.into(), label: label.into(), weight }
    }

    #[test]
    fn test_defaults_when_storage_empty_and_not_persisted() {
        let storage = MemoryStorage::new();
        let list = PrioList::load(storage.clone());
        let keys: Vec<_> = list.list().iter().map(|p| (p.key.as_str(), p.weight)).collect();
        assert_eq!(keys, vec![("high", 1), ("medium", 2), ("low", 3)]);
        assert!(!storage.contains_key(PRIOS_KEY));
    }

    #[test]
    fn test_add_and_remove_persist() {
        let storage = MemoryStorage::new();
        let mut list = PrioList::load(storage.clone());
        list.add(prio("urgent", "Dringend", 0)).unwrap();
        assert_eq!(
            storage.get_item(PRIOS_KEY).unwrap().as_deref(),
            Some("key,label,weight\nhigh,Hoch,1\nmedium,Mittel,2\nlow,Niedrig,3\nurgent,Dringend,0")
        );

        list.remove("medium").unwrap();
        let reloaded = PrioList::load(storage.clone());
        let keys: Vec<_> = reloaded.list().iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["high", "low", "urgent"]);
    }

    #[test]
    fn test_remove_unknown_key_is_noop_but_persists() {
        let storage = MemoryStorage::new();
        let mut list = PrioList::load(storage.clone());
        list.remove("nope").unwrap();
        assert_eq!(list.list().len(), 3);
        assert!(storage.contains_key(PRIOS_KEY));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let storage = MemoryStorage::new();
        let mut list = PrioList::load(storage);
        list.add(prio("high", "Sehr hoch", 0)).unwrap();
        assert_eq!(list.get("high").map(|p| p.label.as_str()), Some("Sehr hoch"));
        assert_eq!(list.weight_of("high"), Some(0));
        assert_eq!(list.weight_of("missing"), None);

        list.remove("high").unwrap();
        assert!(list.get("high").is_none());
    }

    #[test]
    fn test_reload_picks_up_external_writes() {
        let storage = MemoryStorage::new();
        let mut list = PrioList::load(storage.clone());
        storage
            .set_item(PRIOS_KEY, "key,label,weight\nsoon,\"Soon, really\",1")
            .unwrap();
        list.reload();
        assert_eq!(list.list(), &[prio("soon", "Soon, really", 1)]);
    }
}

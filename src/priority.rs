//! Identifier-keyed priority definitions persisted as a JSON object.
//!
//! This is the authoritative priority set that tasks reference by id. The
//! store is seeded with three defaults (high, medium, low) when it is empty and
//! never re-seeded while any priority exists.
//!
//! Stored records are read through [`StoredPriority`], so a record written by
//! an older front end with a fractional `order` or a missing timestamp is kept
//! rather than dropped on the next save.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::codec::{Codec, JsonMapCodec};
use crate::error::{Error, Result};
use crate::fields::{DefaultSlot, PLACEHOLDER_COLOR, UNRANKED_WEIGHT};
use crate::storage::{read_or_absent, Storage};
use crate::task::coerce_text;
use crate::view::PriorityLookup;

/// Storage key of the priority mapping.
pub const PRIORITIES_KEY: &str = "priorities_dict_v1";

/// One ordering/label definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Priority {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Lower sorts earlier. Not unique.
    pub order: i64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// A stored priority record as found on disk, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPriority {
    #[serde(default)]
    name: Value,
    #[serde(default)]
    color: Value,
    #[serde(default)]
    order: Value,
    #[serde(default)]
    created_at: Value,
    #[serde(default)]
    updated_at: Value,
}

impl StoredPriority {
    /// Produce a valid priority keyed by `id`.
    ///
    /// `order` is rounded when fractional and unranked when not a number.
    /// Missing or unparseable timestamps become `now`.
    pub fn normalize(self, id: String, now: DateTime<Utc>) -> Priority {
        let order = coerce_order(&self.order).unwrap_or_else(|| {
            warn!(%id, order = %self.order, "priority order is not a number, treating as unranked");
            UNRANKED_WEIGHT
        });
        let color = match self.color {
            Value::String(c) if !c.trim().is_empty() => Some(c),
            _ => None,
        };
        Priority {
            name: coerce_text(&self.name),
            color,
            order,
            created_at: parse_stamp(&self.created_at).unwrap_or(now),
            updated_at: parse_stamp(&self.updated_at).unwrap_or(now),
            id,
        }
    }
}

fn coerce_order(v: &Value) -> Option<i64> {
    let f = match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            n.as_f64()?
        }
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then(|| f.round() as i64)
}

fn parse_stamp(v: &Value) -> Option<DateTime<Utc>> {
    let s = v.as_str()?;
    DateTime::parse_from_rfc3339(s).ok().map(|d| d.with_timezone(&Utc))
}

/// Partial update of a priority. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PriorityPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub order: Option<i64>,
}

/// Ids of the priorities standing in for the high, medium and low defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultPriorityIds {
    pub high: String,
    pub medium: String,
    pub low: String,
}

impl DefaultPriorityIds {
    pub fn for_slot(&self, slot: DefaultSlot) -> &str {
        match slot {
            DefaultSlot::High => &self.high,
            DefaultSlot::Medium => &self.medium,
            DefaultSlot::Low => &self.low,
        }
    }
}

/// Store owning the priority mapping.
#[derive(Debug)]
pub struct PriorityStore<S: Storage> {
    storage: S,
    codec: JsonMapCodec<Priority>,
    dict: BTreeMap<String, Priority>,
}

impl<S: Storage> PriorityStore<S> {
    /// Load the mapping from storage. Malformed payloads load as empty; each
    /// record is normalized, with the map key as its id.
    pub fn load(storage: S) -> Self {
        let raw = read_or_absent(&storage, PRIORITIES_KEY);
        let now = Utc::now();
        let dict: BTreeMap<String, Priority> = JsonMapCodec::<StoredPriority>::new()
            .decode(raw.as_deref())
            .into_iter()
            .map(|(id, record)| (id.clone(), record.normalize(id, now)))
            .collect();
        debug!(priorities = dict.len(), "loaded priorities");
        Self {
            storage,
            codec: JsonMapCodec::new(),
            dict,
        }
    }

    /// Seed the three defaults when the store is empty, then report which
    /// priorities stand in for high, medium and low.
    pub fn ensure_defaults(&mut self) -> Result<DefaultPriorityIds> {
        let seeded = self.dict.is_empty();
        if seeded {
            let now = Utc::now();
            for slot in DefaultSlot::ALL {
                let id = new_id();
                self.dict.insert(
                    id.clone(),
                    Priority {
                        id,
                        name: slot.label().to_string(),
                        color: Some(slot.color().to_string()),
                        order: slot.weight(),
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
            debug!("seeded default priorities");
        }
        let ids = self.default_ids();
        if seeded {
            self.save()?;
        }
        Ok(ids)
    }

    /// The first three priorities in list order stand in for high, medium and
    /// low. With fewer than three, the missing slots reuse the last one.
    pub fn default_ids(&self) -> DefaultPriorityIds {
        let list = self.list();
        let pick = |i: usize| {
            list.get(i)
                .or_else(|| list.last())
                .map(|p| p.id.clone())
                .unwrap_or_default()
        };
        DefaultPriorityIds {
            high: pick(0),
            medium: pick(1),
            low: pick(2),
        }
    }

    /// Priorities sorted by order, ties broken by name.
    pub fn list(&self) -> Vec<&Priority> {
        let mut list: Vec<_> = self.dict.values().collect();
        list.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        list
    }

    /// Create a priority and return its id.
    ///
    /// `order` defaults to one more than the current maximum (1 in an empty
    /// store), `color` to the placeholder color.
    pub fn add(&mut self, name: &str, color: Option<String>, order: Option<i64>) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        let order = order.unwrap_or_else(|| self.dict.values().map(|p| p.order).max().map_or(1, |m| m.saturating_add(1)));
        let id = new_id();
        let now = Utc::now();
        self.dict.insert(
            id.clone(),
            Priority {
                id: id.clone(),
                name: name.to_string(),
                color: Some(color.unwrap_or_else(|| PLACEHOLDER_COLOR.to_string())),
                order,
                created_at: now,
                updated_at: now,
            },
        );
        self.save()?;
        Ok(id)
    }

    /// Merge `patch` into priority `id`. Unknown ids are ignored.
    pub fn update(&mut self, id: &str, patch: PriorityPatch) -> Result<()> {
        let Some(p) = self.dict.get_mut(id) else {
            return Ok(());
        };
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(Error::EmptyName);
            }
        }
        if let Some(name) = patch.name {
            p.name = name.trim().to_string();
        }
        if let Some(color) = patch.color {
            p.color = Some(color);
        }
        if let Some(order) = patch.order {
            p.order = order;
        }
        p.updated_at = Utc::now();
        self.save()
    }

    /// Delete priority `id` if present. Tasks referencing it become unranked.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        self.dict.remove(id);
        self.save()
    }

    /// Look up a priority; `None` for a missing or unknown id.
    pub fn resolve(&self, id: Option<&str>) -> Option<&Priority> {
        self.dict.get(id?)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.dict.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    fn save(&self) -> Result<()> {
        let encoded = self.codec.encode(&self.dict)?;
        self.storage.set_item(PRIORITIES_KEY, &encoded)
    }
}

impl<S: Storage> PriorityLookup for PriorityStore<S> {
    fn weight_of(&self, reference: &str) -> Option<i64> {
        self.dict.get(reference).map(|p| p.order)
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

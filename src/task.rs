//! Task data structure and related functionality.
//!
//! A `Task` is stored as a record in an id -> record JSON object; the id is the
//! map key and is not repeated inside the record. Records written by older
//! versions carry a numeric `priority` level instead of a priority reference,
//! and may have missing or oddly typed fields. [`StoredTask`] captures such a
//! record loosely and [`StoredTask::normalize`] turns it into a valid `Task`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::DefaultSlot;
use crate::priority::DefaultPriorityIds;

/// One actionable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub priority_ref: Option<String>,
    /// Deprecated numeric level (1=high, 2=medium, 3=low). Only read to derive
    /// `priority_ref` when loading old records; new tasks never set it.
    #[serde(default, rename = "priority", skip_serializing_if = "Option::is_none")]
    pub legacy_priority_level: Option<i64>,
    #[serde(default)]
    pub category_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Merge `patch` into this task, trimming text fields and refreshing
    /// `updated_at` even when nothing else changes.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(desc) = patch.description {
            self.description = trimmed_optional(&desc);
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
        if let Some(priority_ref) = patch.priority_ref {
            self.priority_ref = Some(priority_ref);
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        self.updated_at = now;
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority_ref: Option<String>,
    pub category_id: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority_ref: impl Into<String>) -> Self {
        self.priority_ref = Some(priority_ref.into());
        self
    }

    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }
}

/// Partial update of a task. `None` leaves a field unchanged.
///
/// An empty `description` clears it; `category_id: Some(None)` clears the category.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub done: Option<bool>,
    pub priority_ref: Option<String>,
    pub category_id: Option<Option<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.done.is_none()
            && self.priority_ref.is_none()
            && self.category_id.is_none()
    }
}

/// Trim text, mapping the empty result to `None`.
pub fn trimmed_optional(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// A task record as found in storage, before normalization.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTask {
    #[serde(default)]
    title: Value,
    #[serde(default)]
    description: Value,
    #[serde(default)]
    done: Value,
    #[serde(default)]
    priority_ref: Value,
    #[serde(default)]
    priority: Value,
    #[serde(default)]
    category_id: Value,
    #[serde(default)]
    updated_at: Value,
}

impl StoredTask {
    /// Produce a valid task from a loosely typed record.
    ///
    /// A priority reference that `resolves` rejects is replaced by the default
    /// matching the legacy level (1 -> high, 3 -> low, otherwise medium). The
    /// returned flag is true when that replacement happened.
    pub fn normalize<F>(self, defaults: &DefaultPriorityIds, resolves: F, now: DateTime<Utc>) -> (Task, bool)
    where
        F: Fn(&str) -> bool,
    {
        let current_ref = match &self.priority_ref {
            Value::String(s) if resolves(s.as_str()) => Some(s.clone()),
            _ => None,
        };
        let migrated = current_ref.is_none();
        let priority_ref = current_ref.unwrap_or_else(|| {
            let slot = DefaultSlot::from_legacy_level(Some(&self.priority));
            defaults.for_slot(slot).to_string()
        });

        let updated_at = match &self.updated_at {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or(now),
            _ => now,
        };

        let task = Task {
            title: coerce_text(&self.title),
            description: match &self.description {
                Value::Null => None,
                v => Some(coerce_text(v)),
            },
            done: matches!(self.done, Value::Bool(true)),
            priority_ref: Some(priority_ref),
            legacy_priority_level: self.priority.as_i64(),
            category_id: match self.category_id {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            },
            updated_at,
        };
        (task, migrated)
    }
}

/// Stringify any JSON value as trimmed text; `null` becomes empty.
pub(crate) fn coerce_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

//! Shared field types and constants for priorities.
//!
//! Both priority variants seed the same three defaults (high, medium, low) and
//! share the sentinel weight used for tasks whose priority cannot be resolved.

use serde_json::Value;

/// Sort weight of a task whose priority reference does not resolve.
pub const UNRANKED_WEIGHT: i64 = i64::MAX;

/// Color given to priorities created without one.
pub const PLACEHOLDER_COLOR: &str = "#e5e7eb";

/// One of the three built-in priority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultSlot {
    High,
    Medium,
    Low,
}

impl DefaultSlot {
    pub const ALL: [DefaultSlot; 3] = [DefaultSlot::High, DefaultSlot::Medium, DefaultSlot::Low];

    /// Map a deprecated numeric level (1=high, 2=medium, 3=low) to its slot.
    /// Anything other than 1 or 3, including a missing value, is medium.
    pub fn from_legacy_level(level: Option<&Value>) -> Self {
        match level.and_then(Value::as_f64) {
            Some(n) if n == 1.0 => DefaultSlot::High,
            Some(n) if n == 3.0 => DefaultSlot::Low,
            _ => DefaultSlot::Medium,
        }
    }

    /// Key used by the tabular priority list.
    pub fn key(self) -> &'static str {
        match self {
            DefaultSlot::High => "high",
            DefaultSlot::Medium => "medium",
            DefaultSlot::Low => "low",
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            DefaultSlot::High => "Hoch",
            DefaultSlot::Medium => "Mittel",
            DefaultSlot::Low => "Niedrig",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            DefaultSlot::High => "#fee2e2",
            DefaultSlot::Medium => PLACEHOLDER_COLOR,
            DefaultSlot::Low => "#e0f2fe",
        }
    }

    pub fn weight(self) -> i64 {
        match self {
            DefaultSlot::High => 1,
            DefaultSlot::Medium => 2,
            DefaultSlot::Low => 3,
        }
    }

    /// Parse a slot from its key, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.key().eq_ignore_ascii_case(s.trim()))
    }
}

//! Plain-text rendering of tasks and priorities for the terminal.

use chrono::{DateTime, Utc};

use crate::board::Board;
use crate::prio_list::Prio;
use crate::priority::Priority;
use crate::storage::Storage;
use crate::task::Task;

/// Width of the short id column.
pub const SHORT_ID: usize = 8;

/// Render the derived view as a table, optionally hiding done tasks.
pub fn render_task_table<S: Storage + Clone>(board: &Board<S>, open_only: bool, now: DateTime<Utc>) -> String {
    let mut out = format!(
        "{:<8} {:<4} {:<12} {:<9} {}\n",
        "ID", "Done", "Priority", "Updated", "Title"
    );
    for (id, t) in board.tasks.entries(&board.priorities) {
        if open_only && t.done {
            continue;
        }
        out.push_str(&format!(
            "{:<8} {:<4} {:<12} {:<9} {}\n",
            short_id(id),
            if t.done { "x" } else { "" },
            truncate(&board.priority_label(t), 12),
            format_updated_relative(t.updated_at, now),
            t.title
        ));
    }
    out
}

/// Render one task with every field.
pub fn render_task_detail<S: Storage + Clone>(board: &Board<S>, id: &str, t: &Task) -> String {
    let mut out = String::new();
    out.push_str(&format!("ID:          {id}\n"));
    out.push_str(&format!("Title:       {}\n", t.title));
    out.push_str(&format!("Done:        {}\n", if t.done { "yes" } else { "no" }));
    out.push_str(&format!("Priority:    {}\n", board.priority_label(t)));
    out.push_str(&format!("Category:    {}\n", t.category_id.as_deref().unwrap_or("-")));
    out.push_str(&format!("Updated:     {}\n", t.updated_at.to_rfc3339()));
    if let Some(d) = &t.description {
        out.push_str(&format!("\n{d}\n"));
    }
    out
}

/// Render the identifier-keyed priorities in list order.
pub fn render_priorities(list: &[&Priority]) -> String {
    let mut out = format!("{:<8} {:<6} {:<9} {}\n", "ID", "Order", "Color", "Name");
    for p in list {
        out.push_str(&format!(
            "{:<8} {:<6} {:<9} {}\n",
            short_id(&p.id),
            p.order,
            p.color.as_deref().unwrap_or("-"),
            p.name
        ));
    }
    out
}

/// Render the tabular priority list in stored order.
pub fn render_prio_list(list: &[Prio]) -> String {
    let mut out = format!("{:<12} {:<6} {}\n", "Key", "Weight", "Label");
    for p in list {
        out.push_str(&format!("{:<12} {:<6} {}\n", truncate(&p.key, 12), p.weight, p.label));
    }
    out
}

/// First characters of an id, enough to type back on the command line.
pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID).collect()
}

/// Format a timestamp relative to `now` ("just now", "5m ago", "3h ago", "2d ago").
pub fn format_updated_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now - at;
    if delta.num_minutes() < 1 {
        "just now".into()
    } else if delta.num_hours() < 1 {
        format!("{}m ago", delta.num_minutes())
    } else if delta.num_days() < 1 {
        format!("{}h ago", delta.num_hours())
    } else {
        format!("{}d ago", delta.num_days())
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

use crate::categories::Category;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

// One timed work session on a task.
// `duration` is always end_time - start_time in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    #[serde(default)]
    pub id: u64,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub duration: u64, // ms
}

impl TimeEntry {
    /// Builds an entry, or `None` when `end` precedes `start`.
    pub fn new(id: u64, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Option<Self> {
        let duration = span_ms(start, end)?;
        Some(Self {
            id,
            start_time: start,
            end_time: end,
            duration,
        })
    }
}

// Milliseconds between two instants, None if negative.
pub fn span_ms(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Option<u64> {
    u64::try_from((end - start).num_milliseconds()).ok()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String, // soft reference to Category::name
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub time_entries: Vec<TimeEntry>,
    #[serde(default)]
    pub total_time_spent: u64, // ms, sum of time_entries[*].duration
}

impl Task {
    pub fn recompute_total_time_spent(&mut self) {
        self.total_time_spent = self
            .time_entries
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.duration));
    }

    // completed_at follows the completed flag: set on true, cleared on false
    pub fn set_completed(&mut self, completed: bool, now: DateTime<FixedOffset>) {
        self.completed = completed;
        self.completed_at = completed.then_some(now);
    }
}

// Request body for creating a task.
// id, createdAt, completed and completedAt are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub time_entries: Vec<TimeEntry>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: category.into(),
            priority: Priority::default(),
            due_date: None,
            time_entries: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn due(mut self, due_date: DateTime<FixedOffset>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial update merged onto an existing task.
///
/// Absent fields keep their stored value. `due_date` distinguishes
/// "absent" (`None`) from an explicit JSON `null` (`Some(None)`), which
/// clears the deadline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<FixedOffset>>>,
    pub completed: Option<bool>,
    pub time_entries: Option<Vec<TimeEntry>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// Fixture the store is seeded from at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

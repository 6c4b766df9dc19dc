/*
Task classification, filtering and aggregation rules.
Module was independently written from the store and HTTP layer for testing:
every function takes the task slice and the current instant explicitly.
*/

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::categories::ALL_CATEGORIES;
use crate::models::Task;

// Temporal / completion classification used by the sidebar views
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Today,
    Upcoming,
    Overdue,
    Completed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 5] = [
        StatusFilter::All,
        StatusFilter::Today,
        StatusFilter::Upcoming,
        StatusFilter::Overdue,
        StatusFilter::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Today => "today",
            StatusFilter::Upcoming => "upcoming",
            StatusFilter::Overdue => "overdue",
            StatusFilter::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status filter: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StatusFilter::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// Calendar date of `instant` as seen from `now`'s offset.
fn local_date(instant: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> NaiveDate {
    instant.with_timezone(now.offset()).date_naive()
}

// Due today: due date falls on today's calendar date and task is open.
pub fn is_due_today(task: &Task, now: DateTime<FixedOffset>) -> bool {
    !task.completed
        && task
            .due_date
            .is_some_and(|due| local_date(due, now) == now.date_naive())
}

// Upcoming: due strictly after now and task is open.
pub fn is_upcoming(task: &Task, now: DateTime<FixedOffset>) -> bool {
    !task.completed && task.due_date.is_some_and(|due| due > now)
}

// Overdue: due strictly before now and task is open.
// A completed task is never overdue.
pub fn is_overdue(task: &Task, now: DateTime<FixedOffset>) -> bool {
    !task.completed && task.due_date.is_some_and(|due| due < now)
}

pub fn matches_status(task: &Task, status: StatusFilter, now: DateTime<FixedOffset>) -> bool {
    match status {
        StatusFilter::All => true,
        StatusFilter::Today => is_due_today(task, now),
        StatusFilter::Upcoming => is_upcoming(task, now),
        StatusFilter::Overdue => is_overdue(task, now),
        StatusFilter::Completed => task.completed,
    }
}

// "All" selects everything, otherwise exact case-sensitive name match.
pub fn matches_category(task: &Task, category: &str) -> bool {
    category == ALL_CATEGORIES || task.category == category
}

pub fn by_category(tasks: &[Task], category: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| matches_category(t, category))
        .cloned()
        .collect()
}

pub fn by_status(tasks: &[Task], status: StatusFilter, now: DateTime<FixedOffset>) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| matches_status(t, status, now))
        .cloned()
        .collect()
}

// `needle` must already be lowercased and trimmed.
fn matches_search(task: &Task, needle: &str) -> bool {
    [&task.title, &task.description, &task.category]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

// Case-insensitive substring search over title, description and category.
//
// Rules:
// - blank query returns every task
// - a task matches if any of the three fields contains the query
pub fn search(tasks: &[Task], query: &str) -> Vec<Task> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tasks.to_vec();
    }
    tasks
        .iter()
        .filter(|t| matches_search(t, &needle))
        .cloned()
        .collect()
}

// Category restriction first, status predicate applied to that subset.
pub fn combined_filter(
    tasks: &[Task],
    category: &str,
    status: StatusFilter,
    now: DateTime<FixedOffset>,
) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| matches_category(t, category))
        .filter(|t| matches_status(t, status, now))
        .cloned()
        .collect()
}

/// Dashboard view selection.
///
/// A non-blank `search` wins and ignores the category and status filters;
/// otherwise the category/status pair is applied. Missing filters mean
/// "All" / `all`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TaskQuery {
    #[serde(default, rename = "q")]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<StatusFilter>,
}

pub fn view(tasks: &[Task], query: &TaskQuery, now: DateTime<FixedOffset>) -> Vec<Task> {
    if let Some(q) = query.search.as_deref().filter(|q| !q.trim().is_empty()) {
        return search(tasks, q);
    }
    combined_filter(
        tasks,
        query.category.as_deref().unwrap_or(ALL_CATEGORIES),
        query.status.unwrap_or_default(),
        now,
    )
}

// Count of tasks per known category name. Names no task uses map to 0;
// tasks whose category is not in `names` are not counted anywhere.
pub fn category_counts<'a>(
    tasks: &[Task],
    names: impl IntoIterator<Item = &'a str>,
) -> BTreeMap<String, usize> {
    names
        .into_iter()
        .map(|name| {
            let count = tasks.iter().filter(|t| t.category == name).count();
            (name.to_string(), count)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    pub today_completed: usize,
    pub week_completed: usize,
}

impl ProgressSummary {
    // round(completed / total * 100), 0 for an empty collection
    pub fn completion_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let rate = (self.completed * 200 + self.total) / (self.total * 2);
        u32::try_from(rate).unwrap_or(100)
    }
}

// Monday..=Sunday of the week containing `today`.
fn week_bounds(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let offset = u64::from(today.weekday().num_days_from_monday());
    let start = today.checked_sub_days(Days::new(offset))?;
    let end = start.checked_add_days(Days::new(6))?;
    Some((start, end))
}

pub fn progress_summary(tasks: &[Task], now: DateTime<FixedOffset>) -> ProgressSummary {
    let today = now.date_naive();
    let week = week_bounds(today);

    let mut summary = ProgressSummary {
        total: tasks.len(),
        ..ProgressSummary::default()
    };

    for task in tasks {
        if !task.completed {
            summary.pending += 1;
            if is_overdue(task, now) {
                summary.overdue += 1;
            }
            continue;
        }

        summary.completed += 1;
        let Some(done_on) = task.completed_at.map(|at| local_date(at, now)) else {
            continue;
        };
        if done_on == today {
            summary.today_completed += 1;
        }
        if week.is_some_and(|(start, end)| start <= done_on && done_on <= end) {
            summary.week_completed += 1;
        }
    }

    summary
}

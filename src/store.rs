//! In-memory task store.
//!
//! [`TaskStore`] is the only owner of the task collection. Every operation
//! awaits the configured access latency, then runs under a single lock, so a
//! mutation (id assignment and time totals included) is fully applied before
//! any other operation observes the collection. All returned tasks are
//! clones; editing them never touches stored state.

use std::{fs, path::Path, sync::Arc, time::Duration};

use chrono::{DateTime, FixedOffset};
use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::error::{SeedError, StoreError};
use crate::models::{NewTask, Seed, Task, TaskPatch, TimeEntry, span_ms};

/// Fixture compiled into the binary, used when no seed file is configured.
pub const BUILTIN_SEED: &str = include_str!("../data/seed.json");

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(300);

pub fn load_seed(path: &Path) -> Result<Seed, SeedError> {
    let text = fs::read_to_string(path).map_err(|source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

pub fn builtin_seed() -> Result<Seed, SeedError> {
    Ok(serde_json::from_str(BUILTIN_SEED)?)
}

/// Parses a caller-supplied task id ("12", " 7 ").
pub fn parse_task_id(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

struct Inner {
    tasks: Vec<Task>,
    // highest id ever handed out, so deleted ids are never reissued
    last_id: u64,
}

impl Inner {
    // None once u64::MAX has been handed out
    fn next_id(&mut self) -> Option<u64> {
        let max = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
        self.last_id = self.last_id.max(max).checked_add(1)?;
        Some(self.last_id)
    }

    fn find_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

pub struct TaskStore {
    inner: RwLock<Inner>,
    clock: Arc<dyn Clock>,
    latency: Duration,
}

impl TaskStore {
    /// Creates a store holding a copy of `seed`.
    ///
    /// Seed tasks are normalised: each entry's duration is recomputed from its
    /// instants (reversed spans count as zero) and `total_time_spent` is set
    /// to the sum.
    pub fn new(seed: Vec<Task>, clock: Arc<dyn Clock>, latency: Duration) -> Self {
        let tasks: Vec<Task> = seed.into_iter().map(normalize_seed_task).collect();
        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        Self {
            inner: RwLock::new(Inner { tasks, last_id }),
            clock,
            latency,
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    pub async fn get_all(&self) -> Vec<Task> {
        self.simulate_latency().await;
        self.inner.read().await.tasks.clone()
    }

    pub async fn get_by_id(&self, id: u64) -> Option<Task> {
        self.simulate_latency().await;
        let inner = self.inner.read().await;
        inner.tasks.iter().find(|t| t.id == id).cloned()
    }

    pub async fn create(&self, input: NewTask) -> Result<Task, StoreError> {
        self.simulate_latency().await;
        let title = validate_title(&input.title)?;
        let now = self.clock.now();
        let time_entries = normalize_entries(input.time_entries, now)?;

        let mut inner = self.inner.write().await;
        let Some(id) = inner.next_id() else {
            tracing::warn!("task ids exhausted");
            return Err(StoreError::invalid_input("task ids exhausted"));
        };
        let mut task = Task {
            id,
            title,
            description: input.description,
            category: input.category,
            priority: input.priority,
            due_date: input.due_date,
            completed: false,
            completed_at: None,
            created_at: now,
            time_entries,
            total_time_spent: 0,
        };
        task.recompute_total_time_spent();
        inner.tasks.push(task.clone());
        drop(inner);

        tracing::debug!(task_id = task.id, category = %task.category, "task created");
        Ok(task)
    }

    /// Merges `patch` onto the task with `id`.
    ///
    /// Returns `Ok(None)` when no such task exists. Validation happens before
    /// the collection is touched, so a rejected patch changes nothing.
    pub async fn update(&self, id: u64, patch: TaskPatch) -> Result<Option<Task>, StoreError> {
        self.simulate_latency().await;
        let title = patch.title.as_deref().map(validate_title).transpose()?;
        let now = self.clock.now();
        let time_entries = patch
            .time_entries
            .map(|entries| normalize_entries(entries, now))
            .transpose()?;

        let mut inner = self.inner.write().await;
        let Some(task) = inner.find_mut(id) else {
            tracing::debug!(task_id = id, "update of unknown task");
            return Ok(None);
        };

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(completed) = patch.completed.filter(|c| *c != task.completed) {
            task.set_completed(completed, now);
        }
        if let Some(entries) = time_entries {
            task.time_entries = entries;
        }
        task.recompute_total_time_spent();

        let updated = task.clone();
        drop(inner);
        tracing::debug!(task_id = id, "task updated");
        Ok(Some(updated))
    }

    pub async fn delete(&self, id: u64) -> Option<Task> {
        self.simulate_latency().await;
        let mut inner = self.inner.write().await;
        let index = inner.tasks.iter().position(|t| t.id == id)?;
        let deleted = inner.tasks.remove(index);
        drop(inner);
        tracing::debug!(task_id = id, "task deleted");
        Some(deleted)
    }

    pub async fn toggle_complete(&self, id: u64) -> Option<Task> {
        self.simulate_latency().await;
        let now = self.clock.now();
        let mut inner = self.inner.write().await;
        let task = inner.find_mut(id)?;
        let completed = !task.completed;
        task.set_completed(completed, now);
        let toggled = task.clone();
        drop(inner);
        tracing::debug!(task_id = id, completed, "task toggled");
        Some(toggled)
    }

    /// Records a work session on a task.
    ///
    /// The entry id is derived from the current timestamp and bumped until
    /// it is unique within the task.
    pub async fn add_time_entry(
        &self,
        task_id: u64,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Option<Task>, StoreError> {
        self.simulate_latency().await;
        let now = self.clock.now();

        let mut inner = self.inner.write().await;
        let Some(task) = inner.find_mut(task_id) else {
            return Ok(None);
        };
        let id = unique_entry_id(&task.time_entries, now);
        let entry = TimeEntry::new(id, start, end)
            .ok_or_else(|| StoreError::invalid_input("time entry ends before it starts"))?;

        task.total_time_spent = task.total_time_spent.saturating_add(entry.duration);
        task.time_entries.push(entry);
        let updated = task.clone();
        drop(inner);

        tracing::debug!(task_id, entry_id = id, "time entry added");
        Ok(Some(updated))
    }

    pub async fn remove_time_entry(&self, task_id: u64, entry_id: u64) -> Option<Task> {
        self.simulate_latency().await;
        let mut inner = self.inner.write().await;
        let task = inner.find_mut(task_id)?;
        let index = task.time_entries.iter().position(|e| e.id == entry_id)?;
        let removed = task.time_entries.remove(index);
        task.total_time_spent = task.total_time_spent.saturating_sub(removed.duration);
        let updated = task.clone();
        drop(inner);

        tracing::debug!(task_id, entry_id, "time entry removed");
        Some(updated)
    }
}

fn validate_title(raw: &str) -> Result<String, StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        tracing::warn!("rejected task with empty title");
        return Err(StoreError::invalid_input("title is required"));
    }
    Ok(trimmed.to_string())
}

fn unique_entry_id(existing: &[TimeEntry], now: DateTime<FixedOffset>) -> u64 {
    let mut id = u64::try_from(now.timestamp_millis()).unwrap_or(0).max(1);
    while existing.iter().any(|e| e.id == id) {
        id += 1;
    }
    id
}

// Caller-supplied entries: duration recomputed, missing ids (0) assigned.
fn normalize_entries(
    entries: Vec<TimeEntry>,
    now: DateTime<FixedOffset>,
) -> Result<Vec<TimeEntry>, StoreError> {
    let mut normalized: Vec<TimeEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        let id = if entry.id == 0 || normalized.iter().any(|e| e.id == entry.id) {
            unique_entry_id(&normalized, now)
        } else {
            entry.id
        };
        let entry = TimeEntry::new(id, entry.start_time, entry.end_time)
            .ok_or_else(|| StoreError::invalid_input("time entry ends before it starts"))?;
        normalized.push(entry);
    }
    Ok(normalized)
}

fn normalize_seed_task(mut task: Task) -> Task {
    let task_id = task.id;
    for entry in &mut task.time_entries {
        let entry_id = entry.id;
        entry.duration = span_ms(entry.start_time, entry.end_time).unwrap_or_else(|| {
            tracing::warn!(task_id, entry_id, "seed time entry ends before it starts");
            0
        });
    }
    task.recompute_total_time_spent();
    task
}

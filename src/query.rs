//! Derived views and statistics over the task store.
//!
//! [`QueryEngine`] keeps no task data. Each call reads a fresh snapshot from
//! the store and applies the rules in [`crate::logic`] at the current
//! instant, so results always reflect the latest committed mutation.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::categories::{CategoryDirectory, CategorySummary};
use crate::clock::Clock;
use crate::logic::{self, ProgressSummary, StatusFilter, TaskQuery};
use crate::models::Task;
use crate::store::TaskStore;

pub struct QueryEngine {
    store: Arc<TaskStore>,
    categories: Arc<CategoryDirectory>,
    clock: Arc<dyn Clock>,
}

impl QueryEngine {
    pub fn new(store: Arc<TaskStore>, categories: Arc<CategoryDirectory>) -> Self {
        let clock = store.clock();
        Self {
            store,
            categories,
            clock,
        }
    }

    pub fn categories(&self) -> &CategoryDirectory {
        &self.categories
    }

    pub async fn by_category(&self, name: &str) -> Vec<Task> {
        logic::by_category(&self.store.get_all().await, name)
    }

    pub async fn by_status(&self, status: StatusFilter) -> Vec<Task> {
        let tasks = self.store.get_all().await;
        logic::by_status(&tasks, status, self.clock.now())
    }

    pub async fn search(&self, query: &str) -> Vec<Task> {
        logic::search(&self.store.get_all().await, query)
    }

    pub async fn combined_filter(&self, category: &str, status: StatusFilter) -> Vec<Task> {
        let tasks = self.store.get_all().await;
        logic::combined_filter(&tasks, category, status, self.clock.now())
    }

    pub async fn view(&self, query: &TaskQuery) -> Vec<Task> {
        let tasks = self.store.get_all().await;
        logic::view(&tasks, query, self.clock.now())
    }

    pub async fn category_counts(&self) -> BTreeMap<String, usize> {
        let tasks = self.store.get_all().await;
        logic::category_counts(&tasks, self.categories.names())
    }

    // Known categories in directory order, each with a fresh task count.
    pub async fn categories_with_counts(&self) -> Vec<CategorySummary> {
        let counts = self.category_counts().await;
        self.categories
            .all()
            .iter()
            .map(|c| CategorySummary {
                id: c.id,
                name: c.name.clone(),
                color: c.color.clone(),
                task_count: counts.get(&c.name).copied().unwrap_or(0),
            })
            .collect()
    }

    // Soft lookup: unknown names resolve to id 0 and the default colour,
    // still counting the tasks that reference them.
    pub async fn resolve_category(&self, name: &str) -> CategorySummary {
        let tasks = self.store.get_all().await;
        let known = self.categories.get(name);
        CategorySummary {
            id: known.map_or(0, |c| c.id),
            name: name.to_string(),
            color: self.categories.color_of(name).to_string(),
            task_count: tasks.iter().filter(|t| t.category == name).count(),
        }
    }

    pub async fn progress_summary(&self) -> ProgressSummary {
        let tasks = self.store.get_all().await;
        logic::progress_summary(&tasks, self.clock.now())
    }
}

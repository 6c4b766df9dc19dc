//! TaskFlow: in-memory task store, query rules and a JSON API.
//!
//! The store ([`store::TaskStore`]) owns the task collection; the query
//! engine ([`query::QueryEngine`]) derives status, category and search views
//! plus progress statistics from it. The `routes_*` modules expose both to a
//! presentation layer over HTTP.

pub mod categories;
pub mod clock;
pub mod config;
pub mod error;
pub mod logic;
pub mod models; // Task, TimeEntry, request bodies, seed
pub mod query;
pub mod routes_query; // views, search, categories, stats
pub mod routes_tasks; // task CRUD, toggle, time entries
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::categories::CategoryDirectory;
use crate::clock::Clock;
use crate::models::Seed;
use crate::query::QueryEngine;
use crate::store::TaskStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TaskStore>,
    pub query: Arc<QueryEngine>,
}

impl AppState {
    pub fn new(store: Arc<TaskStore>, categories: CategoryDirectory) -> Self {
        let query = Arc::new(QueryEngine::new(Arc::clone(&store), Arc::new(categories)));
        Self { store, query }
    }

    // Store and category directory built from one seed document
    pub fn from_seed(seed: Seed, clock: Arc<dyn Clock>, latency: Duration) -> Self {
        let store = Arc::new(TaskStore::new(seed.tasks, clock, latency));
        Self::new(store, CategoryDirectory::new(seed.categories))
    }
}

/// Routes mounted under `/api`.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        // tasks
        .route(
            "/tasks",
            get(routes_tasks::list_tasks).post(routes_tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes_tasks::get_task)
                .put(routes_tasks::update_task)
                .delete(routes_tasks::delete_task),
        )
        .route("/tasks/:id/toggle", post(routes_tasks::toggle_task))
        .route("/tasks/:id/time-entries", post(routes_tasks::add_time_entry))
        .route(
            "/tasks/:id/time-entries/:entry_id",
            delete(routes_tasks::remove_time_entry),
        )
        // views
        .route("/views/category/:name", get(routes_query::by_category))
        .route("/views/status/:status", get(routes_query::by_status))
        .route("/search", get(routes_query::search))
        .route("/categories", get(routes_query::categories))
        .route("/categories/counts", get(routes_query::category_counts))
        .route("/categories/:name", get(routes_query::category))
        .route("/stats", get(routes_query::stats))
        .with_state(state)
}

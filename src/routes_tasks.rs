// --------------------------------------------------
// Handles API endpoints for task CRUD operations.
//
// Responsibilities:
// - List tasks for the dashboard view (search / category / status)
// - Create / read / update / delete tasks
// - Toggle completion
// - Add / remove time entries
// --------------------------------------------------

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::logic::TaskQuery;
use crate::models::{NewTask, Task, TaskPatch};
use crate::store::parse_task_id;

fn parse_id(raw: &str) -> Result<u64, ApiError> {
    parse_task_id(raw).ok_or(ApiError::InvalidId)
}

// -----------------------------
// GET /api/tasks?q=&category=&status=
// Dashboard view: search wins, else category + status
// -----------------------------
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskQuery>,
) -> Json<Vec<Task>> {
    Json(state.query.view(&query).await)
}

// -----------------------------
// GET /api/tasks/:id
// -----------------------------
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    state.store.get_by_id(id).await.map(Json).ok_or(ApiError::NotFound)
}

// -----------------------------
// POST /api/tasks
// -----------------------------
pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<NewTask>,
) -> Result<Json<Task>, ApiError> {
    let task = state.store.create(input).await?;
    Ok(Json(task))
}

// -----------------------------
// PUT /api/tasks/:id
// Partial update, absent fields keep their value
// -----------------------------
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    state
        .store
        .update(id, patch)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

// -----------------------------
// DELETE /api/tasks/:id
// Returns the removed task
// -----------------------------
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    state.store.delete(id).await.map(Json).ok_or(ApiError::NotFound)
}

// -----------------------------
// POST /api/tasks/:id/toggle
// Flips completed, stamps / clears completedAt
// -----------------------------
pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    state
        .store
        .toggle_complete(id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryInput {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
}

// -----------------------------
// POST /api/tasks/:id/time-entries
// -----------------------------
pub async fn add_time_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TimeEntryInput>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    state
        .store
        .add_time_entry(id, input.start_time, input.end_time)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

// -----------------------------
// DELETE /api/tasks/:id/time-entries/:entry_id
// -----------------------------
pub async fn remove_time_entry(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(String, String)>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    let entry_id = parse_id(&entry_id)?;
    state
        .store
        .remove_time_entry(id, entry_id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound)
}

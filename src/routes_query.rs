use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::categories::CategorySummary;
use crate::error::ApiError;
use crate::logic::{ProgressSummary, StatusFilter};
use crate::models::Task;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub summary: ProgressSummary,
    pub completion_rate: u32, // percent, 0..=100
}

// GET /api/views/category/:name  ("All" returns everything)
pub async fn by_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<Vec<Task>> {
    Json(state.query.by_category(&name).await)
}

// GET /api/views/status/:status
pub async fn by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let status: StatusFilter = status.parse()?;
    Ok(Json(state.query.by_status(status).await))
}

// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Json<Vec<Task>> {
    Json(state.query.search(&q.q).await)
}

// GET /api/categories
pub async fn categories(State(state): State<AppState>) -> Json<Vec<CategorySummary>> {
    Json(state.query.categories_with_counts().await)
}

// GET /api/categories/:name
// Unknown names still resolve, with the default colour
pub async fn category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<CategorySummary> {
    Json(state.query.resolve_category(&name).await)
}

// GET /api/categories/counts
pub async fn category_counts(State(state): State<AppState>) -> Json<BTreeMap<String, usize>> {
    Json(state.query.category_counts().await)
}

// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let summary = state.query.progress_summary().await;
    Json(StatsResponse {
        completion_rate: summary.completion_rate(),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use chrono::DateTime;

    use crate::clock::FixedClock;
    use crate::store::builtin_seed;

    fn state() -> AppState {
        let now = DateTime::parse_from_rfc3339("2026-10-18T09:00:00+00:00").unwrap();
        let clock = Arc::new(FixedClock::new(now));
        AppState::from_seed(builtin_seed().unwrap(), clock, Duration::ZERO)
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let err = by_status(State(state()), Path("someday".to_string()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("someday"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn category_lookup_returns_colour() {
        let Json(work) = category(State(state()), Path("Work".to_string())).await;
        assert_eq!(work.color, "#5b21b6");
        assert_eq!(work.task_count, 1);

        let Json(unknown) = category(State(state()), Path("Hobbies".to_string())).await;
        assert_eq!(unknown.color, crate::categories::DEFAULT_CATEGORY_COLOR);
        assert_eq!(unknown.task_count, 0);
    }

    #[tokio::test]
    async fn overdue_view_over_builtin_seed() {
        // seed task 2 was due 2026-10-15 and is still open
        let Json(tasks) = by_status(State(state()), Path("overdue".to_string()))
            .await
            .unwrap();
        let ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, [2]);
    }

    #[tokio::test]
    async fn category_view_is_case_sensitive() {
        let Json(work) = by_category(State(state()), Path("Work".to_string())).await;
        assert_eq!(work.len(), 1);
        let Json(lower) = by_category(State(state()), Path("work".to_string())).await;
        assert!(lower.is_empty());
    }

    #[tokio::test]
    async fn categories_sum_to_task_total() {
        let state = state();
        let Json(summaries) = categories(State(state.clone())).await;
        let counted: usize = summaries.iter().map(|c| c.task_count).sum();
        assert_eq!(counted, state.store.get_all().await.len());
    }

    #[tokio::test]
    async fn stats_body_is_flat_camel_case() {
        let response = stats(State(state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["total"], 6);
        assert_eq!(body["completed"], 1);
        assert_eq!(body["pending"], 5);
        assert_eq!(body["overdue"], 1);
        assert_eq!(body["weekCompleted"], 1);
        assert_eq!(body["todayCompleted"], 0);
        assert_eq!(body["completionRate"], 17);
    }
}

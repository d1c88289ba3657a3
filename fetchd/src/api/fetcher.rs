//! Fetcher API handlers: job intake, listing, cancellation and response history.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
};
use serde::Serialize;

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::payload::{self, PayloadError};
use crate::message::{Job, SENTINEL_CONTENT};

#[derive(Debug, Serialize)]
pub struct FetcherId {
    pub id: i64,
}

/// One stored response; sentinel content is rendered as JSON `null`.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub response: Option<String>,
    pub duration: f64,
    pub created_at: f64,
}

/// POST /api/fetcher
/// Register a URL and start polling it
pub async fn create_fetcher(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Json<FetcherId>> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .map(|value| value.to_str().unwrap_or_default());
    payload::check_content_type(content_type)?;

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::Payload(PayloadError::TooLarge)
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })?;

    let fetch = payload::decode(&body)?;
    let job = state.adding.create(fetch)?;
    let id = job.id;
    state.jobs.spawn(job);

    Ok(Json(FetcherId { id }))
}

/// GET /api/fetcher
/// List every registered fetcher, ordered by id
pub async fn list_fetchers(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.fetches.list())
}

/// DELETE /api/fetcher/{id}
/// Forget a fetcher and stop its poller
pub async fn delete_fetcher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<FetcherId>> {
    let job = state
        .fetches
        .remove(id)
        .ok_or_else(|| ApiError::NotFound(format!("Fetcher {} not found", id)))?;

    if !state.jobs.cancel(job.id) {
        tracing::debug!("Fetcher {} removed after its poller had stopped", job.id);
    }

    Ok(Json(FetcherId { id: job.id }))
}

/// GET /api/fetcher/{id}/history
/// Responses stored for a fetcher, in arrival order
pub async fn fetcher_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    if state.fetches.get(id).is_none() {
        return Err(ApiError::NotFound(format!("Fetcher {} not found", id)));
    }

    let entries = state
        .responses
        .history(id)
        .into_iter()
        .map(|record| HistoryEntry {
            response: (record.content != SENTINEL_CONTENT).then_some(record.content),
            duration: record.duration,
            created_at: record.created_at,
        })
        .collect();

    Ok(Json(entries))
}

//! HTTP API: read-only registry views.
//!
//! - `GET /health`      : liveness + live connection count
//! - `GET /users`       : summaries of every live connection
//! - `GET /users/count` : count only
//!
//! All reads go through hub snapshots; nothing here can write presence
//! state.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use livetrack_core::error::LivetrackError;

use crate::app_state::AppState;

pub async fn health(State(app): State<AppState>) -> Response {
    match app.hub().snapshot().await {
        Ok(snap) => Json(json!({
            "status": "ok",
            "connectedCount": snap.count,
            "timestamp": Utc::now(),
        }))
        .into_response(),
        Err(err) => error_response(&err),
    }
}

pub async fn users(State(app): State<AppState>) -> Response {
    match app.hub().snapshot().await {
        Ok(snap) => Json(json!({
            "users": snap.users,
            "count": snap.count,
        }))
        .into_response(),
        Err(err) => error_response(&err),
    }
}

pub async fn users_count(State(app): State<AppState>) -> Response {
    match app.hub().snapshot().await {
        Ok(snap) => Json(json!({ "count": snap.count })).into_response(),
        Err(err) => error_response(&err),
    }
}

fn error_response(err: &LivetrackError) -> Response {
    tracing::error!(%err, "api request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.client_code().as_str() })),
    )
        .into_response()
}

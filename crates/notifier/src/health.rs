//! `GET /health` (§6 health endpoint).

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::NotifierState;

pub fn router(state: Arc<NotifierState>) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

async fn health(State(state): State<Arc<NotifierState>>) -> (StatusCode, Json<serde_json::Value>) {
    let ok = state.redis_ok.load(Ordering::Relaxed);
    let status = if ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = json!({
        "ok": ok,
        "uptime_secs": state.start_time.elapsed().as_secs(),
    });
    (status, Json(body))
}

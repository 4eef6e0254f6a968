//! `GET /health` — returns 200 with `{ok:true, ...}` while the bus
//! connection is healthy, 503 otherwise (§6 health endpoint).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::atomic::Ordering;

use crate::state::AnalyticsState;

pub fn router(state: Arc<AnalyticsState>) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

async fn health(State(state): State<Arc<AnalyticsState>>) -> (StatusCode, Json<serde_json::Value>) {
    let ok = state.redis_ok.load(Ordering::Relaxed);
    let status = if ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = json!({
        "ok": ok,
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "state_version": state.state_version.load(Ordering::Relaxed),
        "tracked_symbols": state.store.len(),
    });
    (status, Json(body))
}

//! `GET /health` — 200 while the bus is reachable, 503 otherwise, with
//! per-DEX-source status surfaced alongside (§4 health endpoint).

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::IngestorState;

pub fn router(state: Arc<IngestorState>) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

async fn health(State(state): State<Arc<IngestorState>>) -> (StatusCode, Json<serde_json::Value>) {
    let ok = state.redis_ok.load(Ordering::Relaxed);
    let status = if ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = json!({
        "ok": ok,
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "raydium": if state.raydium_ok.load(Ordering::Relaxed) { "up" } else { "degraded" },
        "orca": if state.orca_ok.load(Ordering::Relaxed) { "up" } else { "degraded" },
    });
    (status, Json(body))
}

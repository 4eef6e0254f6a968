//! Analytics binary: the hot decision loop (§4.2-4.10).
//!
//! Five long-lived workers, mirroring the teacher's `main.rs` spawn
//! discipline: sharded pipeline workers draining `market.updates`, a
//! throttle/state cleanup loop, a `cmd.requests` consumer for `/signals`, a
//! regime-refresh loop, and the `/health` server. Every worker observes a
//! shared shutdown flag at its next loop boundary.

mod commands;
mod config;
mod health;
mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use soulscout_core::bus::StreamBus;
use soulscout_core::command::{AlertPayload, Command};
use soulscout_core::model::{ListHygiene, MarketUpdate};
use soulscout_core::pipeline::{self, PipelineConfig, PipelineOutcome};
use soulscout_core::scoring::ScoringWeights;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AnalyticsConfig;
use crate::state::AnalyticsState;

const STREAM_MARKET_UPDATES: &str = "market.updates";
const STREAM_ALERTS: &str = "alerts";
const STREAM_CMD_REQUESTS: &str = "cmd.requests";
const STREAM_CMD_REPLIES: &str = "cmd.replies";
const GROUP_ANALYTICS: &str = "analytics";
const BATCH_SIZE: usize = 64;
const BLOCK_MS: usize = 1000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AnalyticsConfig::from_env()?;
    info!(shards = config.pipeline_shards, "analytics starting up");

    let bus = Arc::new(StreamBus::connect(&config.redis_url).await?);
    bus.ping().await?;
    bus.create_consumer_group(STREAM_MARKET_UPDATES, GROUP_ANALYTICS).await?;
    bus.create_consumer_group(STREAM_CMD_REQUESTS, GROUP_ANALYTICS).await?;

    let state = Arc::new(AnalyticsState::new(config));
    let shutdown = Arc::new(AtomicBool::new(false));

    // Per-shard fan-out: a single consumer-group reader dispatches each
    // update to a shard by hash(symbol), preserving per-symbol arrival
    // order without a global serialization point (§9 Design Notes).
    let shard_count = state.config.pipeline_shards.max(1);
    let mut senders = Vec::with_capacity(shard_count);
    for shard in 0..shard_count {
        let (tx, rx) = mpsc::channel::<(String, MarketUpdate)>(1024);
        senders.push(tx);
        spawn_pipeline_shard(shard, rx, state.clone(), shutdown.clone());
    }
    spawn_ingest_reader(bus.clone(), state.clone(), shutdown.clone(), senders);
    spawn_command_consumer(bus.clone(), state.clone(), shutdown.clone());
    spawn_cleanup_worker(state.clone(), shutdown.clone());
    spawn_regime_worker(state.clone(), shutdown.clone());
    spawn_health_server(state.clone());

    info!("all analytics workers running");
    tokio::signal::ctrl_c().await?;
    warn!("shutdown signal received");
    shutdown.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    info!("analytics shut down complete");
    Ok(())
}

fn hash_symbol(symbol: &str, shard_count: usize) -> usize {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    symbol.hash(&mut hasher);
    (hasher.finish() as usize) % shard_count
}

/// Reads `market.updates` in bounded batches and fans each update out to its
/// shard by `hash(symbol)`, per §9's "per-symbol ordering without global
/// serialization" design note.
fn spawn_ingest_reader(
    bus: Arc<StreamBus>,
    state: Arc<AnalyticsState>,
    shutdown: Arc<AtomicBool>,
    senders: Vec<mpsc::Sender<(String, MarketUpdate)>>,
) {
    tokio::spawn(async move {
        let shard_count = senders.len();
        while !shutdown.load(Ordering::SeqCst) {
            let messages = match bus
                .read::<MarketUpdate>(STREAM_MARKET_UPDATES, GROUP_ANALYTICS, "ingest-reader", BATCH_SIZE, BLOCK_MS)
                .await
            {
                Ok(msgs) => msgs,
                Err(e) => {
                    error!(error = %e, "market.updates read failed, backing off");
                    state.redis_ok.store(false, Ordering::Relaxed);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };
            state.redis_ok.store(true, Ordering::Relaxed);
            for msg in messages {
                let symbol = msg.payload.pool.clone();
                let shard = hash_symbol(&symbol, shard_count);
                if senders[shard].send((symbol, msg.payload)).await.is_err() {
                    warn!("pipeline shard channel closed");
                }
                if let Err(e) = bus.ack(STREAM_MARKET_UPDATES, GROUP_ANALYTICS, &msg.id).await {
                    warn!(msg_id = %msg.id, error = %e, "failed to ack market update");
                }
            }
        }
    });
}

/// One shard's pipeline worker: drains its channel in arrival order, runs
/// the full decision pipeline per update, and publishes admitted alerts.
fn spawn_pipeline_shard(
    shard: usize,
    mut rx: mpsc::Receiver<(String, MarketUpdate)>,
    state: Arc<AnalyticsState>,
    shutdown: Arc<AtomicBool>,
) {
    tokio::spawn(async move {
        let bus = match StreamBus::connect(&state.config.redis_url).await {
            Ok(bus) => bus,
            Err(e) => {
                error!(shard, error = %e, "pipeline shard failed to connect to bus");
                return;
            }
        };
        while !shutdown.load(Ordering::SeqCst) {
            let Some((symbol, md)) = rx.recv().await else {
                break;
            };
            let now_ms = chrono::Utc::now().timestamp_millis();
            let corr_id = uuid::Uuid::new_v4().to_string();
            let regime = *state.regime.read();
            let pipeline_config = PipelineConfig {
                base_threshold: state.config.base_threshold,
                weights: ScoringWeights::default(),
            };
            let outcome = pipeline::process_update(
                &state.store,
                &state.throttle,
                &pipeline_config,
                &symbol,
                md,
                ListHygiene::Normal,
                None,
                &regime,
                now_ms,
                corr_id,
            );
            match outcome {
                PipelineOutcome::Admitted(alert) => {
                    info!(shard, symbol = %alert.symbol, band = %alert.band, confidence = alert.confidence, "alert admitted");
                    state.push_recent_alert(alert.clone());
                    let payload: AlertPayload = alert.into();
                    if let Err(e) = bus.append(STREAM_ALERTS, &payload).await {
                        error!(shard, error = %e, "failed to publish alert");
                    }
                }
                PipelineOutcome::NoBand => {}
                PipelineOutcome::Throttled(reject) => {
                    info!(shard, symbol = %symbol, ?reject, "alert throttled");
                }
            }
        }
    });
}

/// Consumes `/signals` requests and replies on `cmd.replies`, correlated by
/// `corr_id` (§4.10). Acknowledges regardless of reply success, per §7.
fn spawn_command_consumer(bus: Arc<StreamBus>, state: Arc<AnalyticsState>, shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        while !shutdown.load(Ordering::SeqCst) {
            let messages = match bus
                .read::<Command>(STREAM_CMD_REQUESTS, GROUP_ANALYTICS, "cmd-consumer", BATCH_SIZE, BLOCK_MS)
                .await
            {
                Ok(msgs) => msgs,
                Err(e) => {
                    error!(error = %e, "cmd.requests read failed, backing off");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };
            for msg in messages {
                if msg.payload.cmd == "signals" {
                    let now_ms = chrono::Utc::now().timestamp_millis();
                    let reply = commands::handle_command(&state, &msg.payload, now_ms);
                    if let Err(e) = bus.append(STREAM_CMD_REPLIES, &reply).await {
                        error!(error = %e, "failed to publish reply");
                    }
                }
                // Other commands (/balance, /holdings, ...) belong to other
                // services; ack unconditionally so a misrouted message never
                // blocks the consumer group (§7: acked regardless).
                if let Err(e) = bus.ack(STREAM_CMD_REQUESTS, GROUP_ANALYTICS, &msg.id).await {
                    warn!(msg_id = %msg.id, error = %e, "failed to ack command");
                }
            }
        }
    });
}

/// Periodic throttle-ledger and state-store eviction (§3 Lifecycle: evicted
/// by periodic cleanup / staleness horizon).
fn spawn_cleanup_worker(state: Arc<AnalyticsState>, shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        while !shutdown.load(Ordering::SeqCst) {
            interval.tick().await;
            let now_ms = chrono::Utc::now().timestamp_millis();
            state.store.cleanup_stale(now_ms, 24.0);
            state.throttle.cleanup_old_records(now_ms, 24.0);
        }
    });
}

/// Periodic regime reassessment: recomputed on an interval rather than per
/// update, since it's a cross-token aggregate (§4.5).
fn spawn_regime_worker(state: Arc<AnalyticsState>, shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        while !shutdown.load(Ordering::SeqCst) {
            interval.tick().await;
            state.refresh_regime();
        }
    });
}

fn spawn_health_server(state: Arc<AnalyticsState>) {
    let port = state.config.health_port;
    tokio::spawn(async move {
        let app = health::router(state);
        let addr = format!("0.0.0.0:{port}");
        match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => {
                info!(%addr, "health endpoint listening");
                if let Err(e) = axum::serve(listener, app).await {
                    error!(error = %e, "health server failed");
                }
            }
            Err(e) => error!(%addr, error = %e, "failed to bind health server"),
        }
    });
}

//! Notifier binary: consumes `alerts`, applies mute/dedup, formats and
//! publishes `outbound.alerts`, and records audit events. Also owns
//! `/silence` and `/resume` from `cmd.requests` since it's the sole holder
//! of mute state.
//!
//! Grounded on the teacher's worker-spawn + graceful-shutdown `main.rs`
//! shape, reused across every SoulScout binary in this workspace.

mod audit;
mod config;
mod dedup;
mod formatter;
mod health;
mod mute_state;
mod redis_kv;
mod state;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use soulscout_core::bus::StreamBus;
use soulscout_core::command::{AlertPayload, Command, Reply};
use soulscout_core::throttle::reason_hash;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::NotifierConfig;
use crate::dedup::DedupManager;
use crate::mute_state::MuteState;
use crate::redis_kv::RedisKv;
use crate::state::NotifierState;

const GROUP_NOTIFIER: &str = "notifier";
const BATCH_SIZE: usize = 64;
const BLOCK_MS: usize = 1000;

/// What actually goes out over the (unspecified) bot transport: formatted
/// text parts, ready to post one-by-one.
#[derive(Debug, Serialize)]
struct OutboundAlert {
    symbol: String,
    band: String,
    parts: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = NotifierConfig::from_env()?;
    info!("notifier starting up");

    let bus = Arc::new(StreamBus::connect(&config.redis_url).await?);
    bus.ping().await?;
    bus.create_consumer_group(&config.stream_alerts_in, GROUP_NOTIFIER).await?;
    bus.create_consumer_group(&config.stream_req, GROUP_NOTIFIER).await?;

    let kv_dedup = RedisKv::connect(&config.redis_url).await?;
    let kv_mute = RedisKv::connect(&config.redis_url).await?;
    let dedup = DedupManager::new(kv_dedup, config.dedup_ttl_seconds);
    let mute = MuteState::new(kv_mute);

    let state = Arc::new(NotifierState {
        config,
        dedup,
        mute,
        redis_ok: AtomicBool::new(true),
        start_time: std::time::Instant::now(),
    });
    let shutdown = Arc::new(AtomicBool::new(false));

    spawn_health_server(state.clone());
    spawn_alert_consumer(bus.clone(), state.clone(), shutdown.clone());
    spawn_command_consumer(bus.clone(), state.clone(), shutdown.clone());

    info!("notifier running");
    tokio::signal::ctrl_c().await?;
    warn!("shutdown signal received");
    shutdown.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    info!("notifier shut down complete");
    Ok(())
}

fn spawn_health_server(state: Arc<NotifierState>) {
    let addr = format!("{}:{}", state.config.listen_addr, state.config.listen_port);
    tokio::spawn(async move {
        let app = health::router(state);
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

/// Drains `alerts`, applies the mute gate and the notifier-local dedup
/// layer, formats survivors, publishes to `outbound.alerts`, and records an
/// audit event either way (published or muted/deduped).
fn spawn_alert_consumer(bus: Arc<StreamBus>, state: Arc<NotifierState>, shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        while !shutdown.load(Ordering::SeqCst) {
            let messages = match bus
                .read::<AlertPayload>(&state.config.stream_alerts_in, GROUP_NOTIFIER, "alert-consumer", BATCH_SIZE, BLOCK_MS)
                .await
            {
                Ok(msgs) => msgs,
                Err(e) => {
                    error!(error = %e, "alerts read failed, backing off");
                    state.redis_ok.store(false, Ordering::Relaxed);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };
            state.redis_ok.store(true, Ordering::Relaxed);

            for msg in messages {
                let alert = msg.payload;
                let hash = reason_hash(&alert.lines);

                if state.mute.is_muted().await {
                    info!(symbol = %alert.symbol, "alert suppressed: muted");
                    let event = audit::build_audit_event("muted", &alert.severity, &alert.symbol, &hash);
                    let _ = bus.append(&state.config.stream_audit, &event).await;
                } else if state.dedup.is_duplicate(&alert.symbol, &alert.severity, &hash).await {
                    info!(symbol = %alert.symbol, "alert suppressed: duplicate");
                    let event = audit::build_audit_event("deduped", &alert.severity, &alert.symbol, &hash);
                    let _ = bus.append(&state.config.stream_audit, &event).await;
                } else {
                    let formatted = formatter::format_alert(&alert);
                    let outbound = OutboundAlert {
                        symbol: alert.symbol.clone(),
                        band: alert.severity.clone(),
                        parts: formatted.parts,
                    };
                    if let Err(e) = bus.append(&state.config.stream_alerts_out, &outbound).await {
                        error!(symbol = %alert.symbol, error = %e, "failed to publish outbound alert");
                    } else {
                        state.dedup.record(&alert.symbol, &alert.severity, &hash).await;
                        let event = audit::build_audit_event("published", &alert.severity, &alert.symbol, &hash);
                        let _ = bus.append(&state.config.stream_audit, &event).await;
                    }
                }

                if let Err(e) = bus.ack(&state.config.stream_alerts_in, GROUP_NOTIFIER, &msg.id).await {
                    warn!(msg_id = %msg.id, error = %e, "failed to ack alert");
                }
            }
        }
    });
}

/// Handles `/silence` and `/resume`; every other command is acked and
/// ignored, since it belongs to another service (§7: acked regardless).
fn spawn_command_consumer(bus: Arc<StreamBus>, state: Arc<NotifierState>, shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        while !shutdown.load(Ordering::SeqCst) {
            let messages = match bus
                .read::<Command>(&state.config.stream_req, GROUP_NOTIFIER, "cmd-consumer", BATCH_SIZE, BLOCK_MS)
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
                let cmd = &msg.payload;
                let reply = match cmd.cmd.as_str() {
                    "silence" => {
                        let minutes = cmd
                            .args
                            .get("minutes")
                            .and_then(|v| v.as_i64())
                            .unwrap_or(state.config.silence_default_minutes);
                        state.mute.set_mute(minutes).await;
                        Some(Reply::ok(cmd.corr_id.as_str(), format!("silenced for {minutes} minutes"), None))
                    }
                    "resume" => {
                        state.mute.clear_mute().await;
                        Some(Reply::ok(cmd.corr_id.as_str(), "alerts resumed", None))
                    }
                    _ => None,
                };
                if let Some(reply) = reply {
                    if let Err(e) = bus.append(&state.config.stream_rep, &reply).await {
                        error!(error = %e, "failed to publish reply");
                    }
                }
                if let Err(e) = bus.ack(&state.config.stream_req, GROUP_NOTIFIER, &msg.id).await {
                    warn!(msg_id = %msg.id, error = %e, "failed to ack command");
                }
            }
        }
    });
}

//! Messaging-gateway binary: polls the bot API for inbound messages, runs
//! them through `gateway::handle_incoming_message`, and consumes
//! `cmd.replies` to fulfill pending command waits.
//!
//! Grounded on the teacher's worker-spawn + graceful-shutdown `main.rs`
//! shape, reused across every SoulScout binary in this workspace.

mod auth;
mod bot_transport;
mod config;
mod gateway;
mod guest;
mod health;
mod parser;
mod rate_limiter;
mod redis_kv;
mod state;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use soulscout_core::bus::StreamBus;
use soulscout_core::command::Reply;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::auth::Authenticator;
use crate::bot_transport::TelegramBotTransport;
use crate::config::GatewayConfig;
use crate::guest::GuestStore;
use crate::rate_limiter::RateLimiter;
use crate::redis_kv::RedisKv;
use crate::state::GatewayState;

const GROUP_GATEWAY: &str = "tg-gateway";
const BATCH_SIZE: usize = 64;
const BLOCK_MS: usize = 1000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::from_env()?;
    info!("tg-gateway starting up");

    let bus = Arc::new(StreamBus::connect(&config.redis_url).await?);
    bus.ping().await?;
    bus.create_consumer_group(&config.stream_rep, GROUP_GATEWAY).await?;

    let kv_guests = RedisKv::connect(&config.redis_url).await?;
    let guests = GuestStore::new(kv_guests);
    let auth = Authenticator::new(config.owner_telegram_id);
    let rate_limiter = RateLimiter::new(config.rate_limit_msgs_per_min.max(1) as usize);
    let http = reqwest::Client::builder().timeout(Duration::from_secs(8)).build()?;
    let bot = Arc::new(TelegramBotTransport::new(config.tg_bot_token.clone(), http));

    let state = Arc::new(GatewayState {
        config,
        auth,
        rate_limiter,
        guests,
        bot,
        pending: Mutex::new(HashMap::new()),
        redis_ok: AtomicBool::new(true),
        start_time: std::time::Instant::now(),
    });
    let shutdown = Arc::new(AtomicBool::new(false));

    spawn_health_server(state.clone());
    spawn_reply_consumer(bus.clone(), state.clone(), shutdown.clone());
    spawn_inbound_poller(bus.clone(), state.clone(), shutdown.clone());

    info!("tg-gateway running");
    tokio::signal::ctrl_c().await?;
    warn!("shutdown signal received");
    shutdown.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    info!("tg-gateway shut down complete");
    Ok(())
}

fn spawn_health_server(state: Arc<GatewayState>) {
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

/// Long-polls the bot API and routes each message through the dispatch
/// pipeline. A failed poll backs off and retries; it never crashes the
/// service over one bad request (§7 error kind 1).
fn spawn_inbound_poller(bus: Arc<StreamBus>, state: Arc<GatewayState>, shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let mut offset = 0i64;
        while !shutdown.load(Ordering::SeqCst) {
            let (messages, next_offset) = match state.bot.poll_updates(offset).await {
                Ok(result) => result,
                Err(e) => {
                    error!(error = %e, "failed to poll inbound messages, backing off");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };
            offset = next_offset;
            for msg in messages {
                let now_ms = chrono::Utc::now().timestamp_millis();
                gateway::handle_incoming_message(&state, &bus, msg.chat_id, msg.user_id, &msg.text, now_ms).await;
            }
        }
    });
}

/// Consumes `cmd.replies` and fulfills the matching pending command wait.
fn spawn_reply_consumer(bus: Arc<StreamBus>, state: Arc<GatewayState>, shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        while !shutdown.load(Ordering::SeqCst) {
            let messages = match bus
                .read::<Reply>(&state.config.stream_rep, GROUP_GATEWAY, "reply-consumer", BATCH_SIZE, BLOCK_MS)
                .await
            {
                Ok(msgs) => msgs,
                Err(e) => {
                    error!(error = %e, "cmd.replies read failed, backing off");
                    state.redis_ok.store(false, Ordering::Relaxed);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };
            state.redis_ok.store(true, Ordering::Relaxed);

            for msg in messages {
                gateway::fulfill_pending(&state, msg.payload);
                if let Err(e) = bus.ack(&state.config.stream_rep, GROUP_GATEWAY, &msg.id).await {
                    warn!(msg_id = %msg.id, error = %e, "failed to ack reply");
                }
            }
        }
    });
}

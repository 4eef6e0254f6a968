//! Portfolio binary: consumes `/balance`, `/holdings`, `/add_wallet`, and
//! `/remove_wallet` from `cmd.requests` and replies on `cmd.replies`,
//! grounded on `original_source/portfolio/src/main.cpp`'s
//! `command_consumer_loop`. Translated into the teacher's `tokio::spawn`
//! worker-per-concern discipline: a command consumer, a `/health` server,
//! and a shared shutdown flag observed at each loop's next iteration.

mod commands;
mod config;
mod health;
mod price_oracle;
mod redis_kv;
mod sources;
mod state;
mod valuation;
mod wallet_registry;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use soulscout_core::bus::StreamBus;
use soulscout_core::command::{AuditEvent, Command};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::PortfolioConfig;
use crate::price_oracle::PriceOracle;
use crate::redis_kv::RedisKv;
use crate::sources::cg::CoinGeckoClient;
use crate::sources::dex::DexClient;
use crate::sources::rpc::SolanaRpcClient;
use crate::state::PortfolioState;
use crate::wallet_registry::WalletRegistry;

const GROUP_PORTFOLIO: &str = "portfolio";
const BATCH_SIZE: usize = 10;
const BLOCK_MS: usize = 1000;
const OWNED_COMMANDS: &[&str] = &["balance", "holdings", "add_wallet", "remove_wallet"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("SoulScout Portfolio service starting up");

    let config = PortfolioConfig::from_env()?;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .build()?;

    let bus = Arc::new(StreamBus::connect(&config.redis_url).await?);
    bus.ping().await?;
    bus.create_consumer_group(&config.stream_req, GROUP_PORTFOLIO).await?;

    let rpc = SolanaRpcClient::new(config.rpc_urls.clone(), http.clone());
    let cg = CoinGeckoClient::new(config.coingecko_base.clone(), http.clone());
    let dex = DexClient::new(config.raydium_base.clone(), config.orca_base.clone(), http.clone());
    let oracle = PriceOracle::new(cg, dex);
    let wallet_kv = RedisKv::connect(&config.redis_url).await?;
    let wallets = WalletRegistry::new(wallet_kv);

    let state = Arc::new(PortfolioState::new(config, rpc, oracle, wallets));
    let shutdown = Arc::new(AtomicBool::new(false));

    spawn_command_consumer(bus.clone(), state.clone(), shutdown.clone());
    spawn_health_server(state.clone());

    info!("all portfolio workers running");
    tokio::signal::ctrl_c().await?;
    warn!("shutdown signal received");
    shutdown.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    info!("portfolio shut down complete");
    Ok(())
}

/// Consumes `cmd.requests` under the `portfolio` consumer group and
/// replies on `cmd.replies`. Acknowledges every message regardless of
/// reply success (§7: the original request is acked regardless of whether
/// the command surfaces an `ok:false` user-visible failure).
fn spawn_command_consumer(bus: Arc<StreamBus>, state: Arc<PortfolioState>, shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        while !shutdown.load(Ordering::SeqCst) {
            let messages = match bus
                .read::<Command>(&state.config.stream_req, GROUP_PORTFOLIO, "portfolio-consumer", BATCH_SIZE, BLOCK_MS)
                .await
            {
                Ok(msgs) => {
                    state.redis_ok.store(true, Ordering::Relaxed);
                    msgs
                }
                Err(e) => {
                    error!(error = %e, "cmd.requests read failed, backing off");
                    state.redis_ok.store(false, Ordering::Relaxed);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };

            for msg in messages {
                if OWNED_COMMANDS.contains(&msg.payload.cmd.as_str()) {
                    let reply = commands::handle_command(&state, &msg.payload).await;
                    if let Err(e) = bus.append(&state.config.stream_rep, &reply).await {
                        error!(error = %e, "failed to publish reply");
                    }
                    if matches!(msg.payload.cmd.as_str(), "add_wallet" | "remove_wallet") && reply.ok {
                        let event = AuditEvent::new(
                            "portfolio",
                            format!("wallet_{}", if msg.payload.cmd == "add_wallet" { "added" } else { "removed" }),
                            serde_json::json!({"tg_user_id": msg.payload.from.tg_user_id}),
                        );
                        if let Err(e) = bus.append(&state.config.stream_audit, &event).await {
                            warn!(error = %e, "failed to publish audit event");
                        }
                    }
                }
                // Commands owned by other consumers of `cmd.requests`
                // (e.g. analytics' `/signals`) are ignored here but still
                // acked so this consumer group never stalls on them.
                if let Err(e) = bus.ack(&state.config.stream_req, GROUP_PORTFOLIO, &msg.id).await {
                    warn!(msg_id = %msg.id, error = %e, "failed to ack command");
                }
            }
        }
    });
}

fn spawn_health_server(state: Arc<PortfolioState>) {
    let port = state.config.listen_port;
    let addr_base = state.config.listen_addr.clone();
    tokio::spawn(async move {
        let app = health::router(state);
        let addr = format!("{addr_base}:{port}");
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

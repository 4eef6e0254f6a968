//! Ingestor binary: fetches pool data from DEX sources, normalizes it,
//! synthesizes 5m/15m bars, and publishes `MarketUpdate`s onto
//! `market.updates` for analytics to consume.
//!
//! Grounded on `original_source/ingestor/src/main.cpp`'s `ingest_loop`:
//! per-tick fetch from Raydium and Orca, normalize, feed bar synthesizers
//! keyed by pool address, look up a Jupiter route on each completed 5m bar,
//! and publish. Translated into the teacher's `tokio::spawn` +
//! `tokio::time::interval` idiom in place of the original's dedicated
//! ingest thread, with Postgres persistence (`store_pg.cpp`) left out — this
//! system's durable state lives in analytics, not in the ingestor.

mod config;
mod health;
mod impact_model;
mod normalize;
mod sources;
mod state;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use soulscout_core::bar_synth::BarSynthesizer;
use soulscout_core::bus::StreamBus;
use soulscout_core::model::{Bar, MarketUpdate, PriceTick, Route};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::IngestorConfig;
use crate::sources::{jupiter::JupiterClient, orca::OrcaClient, raydium::RaydiumClient};
use crate::state::IngestorState;

/// Per-pool bar synthesis and bookkeeping carried across ticks.
struct PoolTrack {
    bar_5m: BarSynthesizer,
    bar_15m: BarSynthesizer,
    latest_bar_5m: Bar,
    latest_bar_15m: Bar,
    latest_route: Route,
    first_liq_ts_ms: Option<i64>,
}

impl PoolTrack {
    fn new(cfg: &IngestorConfig) -> anyhow::Result<Self> {
        Ok(Self {
            bar_5m: BarSynthesizer::new(cfg.bar_interval_5m_seconds)
                .map_err(|e| anyhow::anyhow!(e.to_string()))?,
            bar_15m: BarSynthesizer::new(cfg.bar_interval_15m_seconds)
                .map_err(|e| anyhow::anyhow!(e.to_string()))?,
            latest_bar_5m: Bar::default(),
            latest_bar_15m: Bar::default(),
            latest_route: Route::default(),
            first_liq_ts_ms: None,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = IngestorConfig::from_env()?;
    info!(tick_seconds = config.global_tick_seconds, "ingestor starting up");

    let bus = Arc::new(StreamBus::connect(&config.redis_url).await?);
    bus.ping().await?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .build()?;

    let raydium = RaydiumClient::new(config.raydium_base.clone(), http.clone());
    let orca = OrcaClient::new(config.orca_base.clone(), http.clone());
    let jupiter = JupiterClient::new(config.jupiter_base.clone(), http.clone());

    let state = Arc::new(IngestorState::new(config));
    let shutdown = Arc::new(AtomicBool::new(false));

    spawn_health_server(state.clone());
    spawn_ingest_loop(bus, raydium, orca, jupiter, state.clone(), shutdown.clone());

    info!("ingestor running");
    tokio::signal::ctrl_c().await?;
    warn!("shutdown signal received");
    shutdown.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    info!("ingestor shut down complete");
    Ok(())
}

fn spawn_health_server(state: Arc<IngestorState>) {
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

fn spawn_ingest_loop(
    bus: Arc<StreamBus>,
    raydium: RaydiumClient,
    orca: OrcaClient,
    jupiter: JupiterClient,
    state: Arc<IngestorState>,
    shutdown: Arc<AtomicBool>,
) {
    tokio::spawn(async move {
        let mut tracks: HashMap<String, PoolTrack> = HashMap::new();
        let mut interval = tokio::time::interval(Duration::from_secs(state.config.global_tick_seconds));

        while !shutdown.load(Ordering::SeqCst) {
            interval.tick().await;
            let now_ms = chrono::Utc::now().timestamp_millis();

            let raydium_pools = raydium.get_pools().await;
            state.raydium_ok.store(!raydium_pools.is_empty(), Ordering::Relaxed);
            let orca_pools = orca.get_pools().await;
            state.orca_ok.store(!orca_pools.is_empty(), Ordering::Relaxed);

            let mut processed = 0usize;
            for (raw, dex) in raydium_pools.iter().map(|p| (p, "raydium"))
                .chain(orca_pools.iter().map(|p| (p, "orca")))
            {
                match process_pool(raw, dex, now_ms, &jupiter, &mut tracks, &state.config).await {
                    Ok(update) => {
                        if let Err(e) = bus.append(&state.config.stream_market, &update).await {
                            error!(pool = %update.pool, error = %e, "failed to publish market update");
                            state.redis_ok.store(false, Ordering::Relaxed);
                        } else {
                            state.redis_ok.store(true, Ordering::Relaxed);
                            processed += 1;
                        }
                    }
                    Err(e) => error!(pool = %raw.address, error = %e, "failed to process pool"),
                }
            }
            info!(processed, "tick complete");
        }
    });
}

/// Normalizes one raw pool, advances its bar synthesizers, refreshes the
/// Jupiter route on newly completed bars, and assembles the `MarketUpdate`
/// to publish (mirrors the original `ingest_loop`'s per-pool body).
async fn process_pool(
    raw: &sources::PoolData,
    dex: &str,
    now_ms: i64,
    jupiter: &JupiterClient,
    tracks: &mut HashMap<String, PoolTrack>,
    cfg: &IngestorConfig,
) -> anyhow::Result<MarketUpdate> {
    let normalized = normalize::normalize_pool(raw, dex);

    if !tracks.contains_key(&normalized.address) {
        tracks.insert(normalized.address.clone(), PoolTrack::new(cfg)?);
    }
    let track = tracks.get_mut(&normalized.address).expect("just inserted");

    if track.first_liq_ts_ms.is_none() && normalized.liq_usd > 0.0 {
        track.first_liq_ts_ms = Some(now_ms);
    }

    let tick = PriceTick {
        price: normalized.price,
        // The original approximates per-tick volume from 24h volume over
        // 288 five-minute buckets in a day; kept as-is.
        volume_usd: normalized.vol24h_usd / 288.0,
        ts_ms: now_ms,
    };
    track.bar_5m.add_tick(tick);
    track.bar_15m.add_tick(tick);

    for bar in track.bar_5m.drain_completed(now_ms) {
        track.latest_bar_5m = Bar {
            o: bar.open,
            h: bar.high,
            l: bar.low,
            c: bar.close,
            v_usd: bar.volume_usd,
        };
        let route = jupiter.get_route(&normalized.mint_base, "USDC").await;
        track.latest_route = Route {
            ok: route.ok,
            hops: route.hops,
            deviation_pct: route.dev_pct,
        };
    }
    for bar in track.bar_15m.drain_completed(now_ms) {
        track.latest_bar_15m = Bar {
            o: bar.open,
            h: bar.high,
            l: bar.low,
            c: bar.close,
            v_usd: bar.volume_usd,
        };
    }

    let age_hours = track
        .first_liq_ts_ms
        .map(|first| (now_ms - first) as f64 / 3_600_000.0)
        .unwrap_or(0.0);

    Ok(MarketUpdate {
        pool: normalized.address,
        mint_base: normalized.mint_base,
        mint_quote: normalized.mint_quote,
        price: normalized.price,
        liq_usd: normalized.liq_usd,
        vol24h_usd: normalized.vol24h_usd,
        spread_pct: normalized.spread_pct,
        impact_1pct_pct: normalized.impact_1pct_pct,
        age_hours,
        route: track.latest_route,
        bar_5m: track.latest_bar_5m,
        bar_15m: track.latest_bar_15m,
        dq: normalized.dq,
        ts_ms: now_ms,
    })
}

//! Shared ingestor state: per-source health flags surfaced on `/health`,
//! grounded on the original `HealthCheck::update_dex_status` /
//! `HealthCheck::is_healthy` cascade (a tick is healthy only while the bus
//! is reachable; individual DEX sources degrade independently).

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use crate::config::IngestorConfig;

pub struct IngestorState {
    pub config: IngestorConfig,
    pub redis_ok: AtomicBool,
    pub raydium_ok: AtomicBool,
    pub orca_ok: AtomicBool,
    pub start_time: Instant,
}

impl IngestorState {
    pub fn new(config: IngestorConfig) -> Self {
        Self {
            config,
            redis_ok: AtomicBool::new(true),
            raydium_ok: AtomicBool::new(true),
            orca_ok: AtomicBool::new(true),
            start_time: Instant::now(),
        }
    }
}

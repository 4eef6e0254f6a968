//! Shared analytics service state, one instance per process, the way the
//! teacher's `AppState` wraps every long-lived subsystem behind `Arc`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;
use soulscout_core::model::{AlertRecord, RegimeAssessment};
use soulscout_core::regime;
use soulscout_core::state_store::RollingStateStore;
use soulscout_core::throttle::ThrottleLedger;

use crate::config::AnalyticsConfig;

const MAX_RECENT_ALERTS: usize = 500;

pub struct AnalyticsState {
    pub config: AnalyticsConfig,
    pub store: RollingStateStore,
    pub throttle: ThrottleLedger,
    pub regime: RwLock<RegimeAssessment>,
    pub recent_alerts: RwLock<VecDeque<AlertRecord>>,
    pub state_version: AtomicU64,
    pub redis_ok: std::sync::atomic::AtomicBool,
    pub start_time: Instant,
}

impl AnalyticsState {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            throttle: ThrottleLedger::new(config.throttle_config()),
            config,
            store: RollingStateStore::new(),
            regime: RwLock::new(regime::assess_regime(&RollingStateStore::new())),
            recent_alerts: RwLock::new(VecDeque::new()),
            state_version: AtomicU64::new(0),
            redis_ok: std::sync::atomic::AtomicBool::new(true),
            start_time: Instant::now(),
        }
    }

    pub fn refresh_regime(&self) {
        let assessment = regime::assess_regime(&self.store);
        *self.regime.write() = assessment;
        self.state_version.fetch_add(1, Ordering::Relaxed);
    }

    pub fn push_recent_alert(&self, alert: AlertRecord) {
        let mut recent = self.recent_alerts.write();
        recent.push_back(alert);
        while recent.len() > MAX_RECENT_ALERTS {
            recent.pop_front();
        }
    }

    pub fn recent_alerts_within(&self, window_ms: i64, now_ms: i64) -> Vec<AlertRecord> {
        let cutoff = now_ms - window_ms;
        self.recent_alerts
            .read()
            .iter()
            .filter(|a| a.ts_ms >= cutoff)
            .cloned()
            .collect()
    }
}

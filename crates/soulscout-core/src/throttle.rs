//! Throttle engine (§4.8): four independent filters applied in order,
//! short-circuiting, with the admit-and-record step held under a single
//! lock so concurrent updates for the same key cannot both pass.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::model::Band;

const SECONDS_PER_HOUR: i64 = 3600;

#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    pub cooldown_actionable_hours: f64,
    pub cooldown_headsup_hours: f64,
    pub global_actionable_max_per_hour: usize,
    pub dedup_ttl_seconds: i64,
    pub reentry_guard_hours: f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            cooldown_actionable_hours: 6.0,
            cooldown_headsup_hours: 1.0,
            global_actionable_max_per_hour: 5,
            dedup_ttl_seconds: 21_600,
            reentry_guard_hours: 12.0,
        }
    }
}

impl ThrottleConfig {
    fn cooldown_seconds(&self, band: Band) -> i64 {
        let hours = match band {
            Band::Actionable | Band::HighConviction => self.cooldown_actionable_hours,
            _ => self.cooldown_headsup_hours,
        };
        (hours * SECONDS_PER_HOUR as f64) as i64
    }
}

#[derive(Debug, Clone)]
struct AlertRecordEntry {
    reason_hash: String,
    ts_ms: i64,
}

#[derive(Default)]
struct Inner {
    token_history: HashMap<String, VecDeque<AlertRecordEntry>>,
    global_alert_times_ms: VecDeque<i64>,
    stop_times_ms: HashMap<String, i64>,
}

/// Reason why an alert was suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleReject {
    TokenCooldown,
    GlobalCap,
    ReasonDuplicate,
    ReentryGuard,
}

pub struct ThrottleLedger {
    inner: Mutex<Inner>,
    config: ThrottleConfig,
}

/// Stable fingerprint over an ordered reason list, used for semantic-
/// duplicate detection across redeliveries. A cryptographic digest
/// (rather than a process-local hasher) keeps the fingerprint stable
/// across restarts, which matters since ledger state is reconstructed
/// from the stream on every restart.
pub fn reason_hash(reasons: &[String]) -> String {
    let joined = reasons.join("|");
    let digest = Sha256::digest(joined.as_bytes());
    hex::encode(digest)
}

fn key_for(symbol: &str, band: Band) -> String {
    format!("{symbol}:{band}")
}

impl ThrottleLedger {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            config,
        }
    }

    /// Runs all four filters and, if every one passes, atomically records
    /// the admission. Returns `Ok(())` on admit or the first failing filter.
    pub fn check_and_record(
        &self,
        symbol: &str,
        band: Band,
        reasons: &[String],
        now_ms: i64,
    ) -> Result<(), ThrottleReject> {
        let hash = reason_hash(reasons);
        let mut inner = self.inner.lock();

        // 1. Per-token cooldown.
        let key = key_for(symbol, band);
        if let Some(history) = inner.token_history.get(&key) {
            if let Some(last) = history.back() {
                let cooldown_ms = self.config.cooldown_seconds(band) * 1000;
                if now_ms - last.ts_ms < cooldown_ms {
                    return Err(ThrottleReject::TokenCooldown);
                }
            }
        }

        // 2. Global hourly cap: evict stale entries, then check capacity.
        let cutoff = now_ms - SECONDS_PER_HOUR * 1000;
        while matches!(inner.global_alert_times_ms.front(), Some(ts) if *ts < cutoff) {
            inner.global_alert_times_ms.pop_front();
        }
        if inner.global_alert_times_ms.len() >= self.config.global_actionable_max_per_hour {
            return Err(ThrottleReject::GlobalCap);
        }

        // 3. Reason-hash dedup: scan every key for this symbol, any band.
        let dedup_cutoff = now_ms - self.config.dedup_ttl_seconds * 1000;
        let prefix = format!("{symbol}:");
        let is_duplicate = inner
            .token_history
            .iter()
            .filter(|(k, _)| k.starts_with(&prefix))
            .any(|(_, history)| {
                history
                    .iter()
                    .any(|e| e.ts_ms >= dedup_cutoff && e.reason_hash == hash)
            });
        if is_duplicate {
            return Err(ThrottleReject::ReasonDuplicate);
        }

        // 4. Re-entry guard.
        let guard_ms = (self.config.reentry_guard_hours * SECONDS_PER_HOUR as f64) as i64 * 1000;
        if let Some(stop_ts) = inner.stop_times_ms.get(symbol) {
            if now_ms - stop_ts < guard_ms {
                return Err(ThrottleReject::ReentryGuard);
            }
        }

        // All filters passed: record atomically.
        inner
            .token_history
            .entry(key)
            .or_default()
            .push_back(AlertRecordEntry {
                reason_hash: hash,
                ts_ms: now_ms,
            });
        inner.global_alert_times_ms.push_back(now_ms);
        Ok(())
    }

    /// Records a stop for `symbol`, arming the re-entry guard.
    pub fn record_stop(&self, symbol: &str, now_ms: i64) {
        self.inner
            .lock()
            .stop_times_ms
            .insert(symbol.to_string(), now_ms);
    }

    /// Evicts per-key history entries and stop timestamps older than
    /// `max_age_hours`.
    pub fn cleanup_old_records(&self, now_ms: i64, max_age_hours: f64) {
        let cutoff = now_ms - (max_age_hours * SECONDS_PER_HOUR as f64) as i64 * 1000;
        let mut inner = self.inner.lock();
        inner.token_history.retain(|_, history| {
            while matches!(history.front(), Some(e) if e.ts_ms < cutoff) {
                history.pop_front();
            }
            !history.is_empty()
        });
        inner.stop_times_ms.retain(|_, ts| *ts >= cutoff);
        while matches!(inner.global_alert_times_ms.front(), Some(ts) if *ts < cutoff) {
            inner.global_alert_times_ms.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons(tag: &str) -> Vec<String> {
        vec![format!("reason-{tag}")]
    }

    #[test]
    fn reason_hash_is_stable_and_order_sensitive() {
        let a = reason_hash(&["x".to_string(), "y".to_string()]);
        let b = reason_hash(&["x".to_string(), "y".to_string()]);
        let c = reason_hash(&["y".to_string(), "x".to_string()]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn token_cooldown_rejects_within_window() {
        let ledger = ThrottleLedger::new(ThrottleConfig::default());
        assert!(ledger
            .check_and_record("SOL", Band::Actionable, &reasons("a"), 0)
            .is_ok());
        let result = ledger.check_and_record("SOL", Band::Actionable, &reasons("b"), 1000);
        assert_eq!(result, Err(ThrottleReject::TokenCooldown));
    }

    #[test]
    fn global_cap_rejects_sixth_alert_in_hour() {
        let ledger = ThrottleLedger::new(ThrottleConfig::default());
        for i in 0..5 {
            let symbol = format!("TOK{i}");
            assert!(ledger
                .check_and_record(&symbol, Band::Actionable, &reasons(&symbol), i as i64 * 1000)
                .is_ok());
        }
        let result = ledger.check_and_record("TOK5", Band::Actionable, &reasons("x"), 6000);
        assert_eq!(result, Err(ThrottleReject::GlobalCap));
    }

    #[test]
    fn reason_dedup_rejects_identical_hash_within_ttl() {
        let ledger = ThrottleLedger::new(ThrottleConfig::default());
        assert!(ledger
            .check_and_record("SOL", Band::HeadsUp, &reasons("same"), 0)
            .is_ok());
        // Different band, same symbol, same reason hash, still within TTL.
        let result = ledger.check_and_record("SOL", Band::Actionable, &reasons("same"), 1000);
        assert_eq!(result, Err(ThrottleReject::ReasonDuplicate));
    }

    #[test]
    fn reentry_guard_rejects_after_stop() {
        let ledger = ThrottleLedger::new(ThrottleConfig::default());
        ledger.record_stop("SOL", 0);
        let result = ledger.check_and_record("SOL", Band::HeadsUp, &reasons("a"), 1000);
        assert_eq!(result, Err(ThrottleReject::ReentryGuard));
    }

    #[test]
    fn admits_after_cooldown_and_guard_windows_elapse() {
        let ledger = ThrottleLedger::new(ThrottleConfig::default());
        ledger.record_stop("SOL", 0);
        let guard_ms = (12.0 * SECONDS_PER_HOUR as f64) as i64 * 1000;
        let result = ledger.check_and_record("SOL", Band::HeadsUp, &reasons("a"), guard_ms + 1);
        assert!(result.is_ok());
    }
}

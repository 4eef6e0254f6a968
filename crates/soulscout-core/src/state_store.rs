//! Rolling per-token state store (§4.2).
//!
//! Keyed by symbol, guarded by a single `RwLock` so queries observe a
//! consistent snapshot per token while updates from other symbols proceed
//! independently. `m1h`/`m24h` validate that the "N entries back" sample is
//! actually close to the intended time horizon instead of blindly trusting
//! tick cadence, closing the gap the naive fixed-offset lookback left open.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::model::{MarketUpdate, TokenState};

const ONE_HOUR_MS: i64 = 3_600_000;
const ONE_MINUTE_MS: i64 = 60_000;
const ENTRIES_PER_HOUR: usize = 60;

/// Acceptable window, in minutes, for the m1h lookback sample: the spec
/// flags the unvalidated "60 entries back" lookback as a bug when tick
/// cadence is irregular; here the sample must fall within [50, 70] minutes
/// behind `latest`, else the closest-timestamped entry in history is used.
const M1H_MIN_MINUTES: i64 = 50;
const M1H_MAX_MINUTES: i64 = 70;

/// Analogous window for m24h, in hours.
const M24H_MIN_HOURS: i64 = 22;
const M24H_MAX_HOURS: i64 = 26;

pub struct RollingStateStore {
    tokens: RwLock<HashMap<String, TokenState>>,
}

impl RollingStateStore {
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Applies a market update for `symbol`, creating the `TokenState`
    /// lazily on first sight.
    pub fn update(&self, symbol: &str, md: MarketUpdate) {
        let mut tokens = self.tokens.write();
        match tokens.get_mut(symbol) {
            Some(state) => state.push(md),
            None => {
                tokens.insert(symbol.to_string(), TokenState::new(symbol, md));
            }
        }
    }

    /// Runs `f` against a consistent snapshot of the token's state, if it
    /// exists. This is the only way callers observe `TokenState` — no
    /// interior references are handed out.
    pub fn with_token<R>(&self, symbol: &str, f: impl FnOnce(&TokenState) -> R) -> Option<R> {
        let tokens = self.tokens.read();
        tokens.get(symbol).map(f)
    }

    pub fn symbols(&self) -> Vec<String> {
        self.tokens.read().keys().cloned().collect()
    }

    /// Evicts any token whose latest timestamp is older than `max_age_hours`
    /// relative to `now_ms`.
    pub fn cleanup_stale(&self, now_ms: i64, max_age_hours: f64) {
        let cutoff = now_ms - (max_age_hours * ONE_HOUR_MS as f64) as i64;
        self.tokens
            .write()
            .retain(|_, state| state.latest.ts_ms >= cutoff);
    }

    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RollingStateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Percent change helper shared by m1h/m24h: `((latest - old) / old) * 100`,
/// 0.0 if either price is non-positive.
fn percent_change(old_price: f64, latest_price: f64) -> f64 {
    if old_price <= 0.0 || latest_price <= 0.0 {
        return 0.0;
    }
    ((latest_price - old_price) / old_price) * 100.0
}

/// Finds the history entry whose timestamp is closest to `target_ms`.
fn closest_to(history: &std::collections::VecDeque<MarketUpdate>, target_ms: i64) -> Option<&MarketUpdate> {
    history
        .iter()
        .min_by_key(|md| (md.ts_ms - target_ms).abs())
}

/// m1h (§4.2, §9 open question resolved): percent change from the entry
/// ~60 entries behind `latest`, validated to lie within [50, 70] minutes of
/// `latest.ts_ms`. If the naive index is out of that window (irregular tick
/// cadence) or doesn't exist, falls back to whichever history entry's
/// timestamp is closest to `latest.ts_ms - 60min`. Returns 0.0 if history is
/// too short to sample anything.
pub fn m1h(state: &TokenState) -> f64 {
    let history = &state.history;
    if history.is_empty() {
        return 0.0;
    }
    let latest = &state.latest;
    let target_ms = latest.ts_ms - ONE_HOUR_MS;

    let indexed = history.len().checked_sub(ENTRIES_PER_HOUR).and_then(|i| history.get(i));
    let candidate = indexed.filter(|md| {
        let delta_min = (latest.ts_ms - md.ts_ms) / ONE_MINUTE_MS;
        (M1H_MIN_MINUTES..=M1H_MAX_MINUTES).contains(&delta_min)
    });

    let chosen = candidate.or_else(|| closest_to(history, target_ms));
    match chosen {
        Some(old) => percent_change(old.price, latest.price),
        None => 0.0,
    }
}

/// m24h, analogous to m1h but against the oldest-in-window entry, validated
/// to lie within [22h, 26h] of `latest.ts_ms`.
pub fn m24h(state: &TokenState) -> f64 {
    let history = &state.history;
    if history.is_empty() {
        return 0.0;
    }
    let latest = &state.latest;
    let target_ms = latest.ts_ms - 24 * ONE_HOUR_MS;

    let front = history.front();
    let candidate = front.filter(|md| {
        let delta_hr = (latest.ts_ms - md.ts_ms) / ONE_HOUR_MS;
        (M24H_MIN_HOURS..=M24H_MAX_HOURS).contains(&delta_hr)
    });

    let chosen = candidate.or_else(|| closest_to(history, target_ms));
    match chosen {
        Some(old) => percent_change(old.price, latest.price),
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bar, DataQuality, Route};

    fn md(price: f64, ts_ms: i64) -> MarketUpdate {
        MarketUpdate {
            pool: "pool".into(),
            mint_base: "base".into(),
            mint_quote: "quote".into(),
            price,
            liq_usd: 100_000.0,
            vol24h_usd: 500_000.0,
            spread_pct: 0.3,
            impact_1pct_pct: 0.2,
            age_hours: 200.0,
            route: Route {
                ok: true,
                hops: 1,
                deviation_pct: 0.0,
            },
            bar_5m: Bar {
                o: price,
                h: price,
                l: price,
                c: price,
                v_usd: 1000.0,
            },
            bar_15m: Bar {
                o: price,
                h: price,
                l: price,
                c: price,
                v_usd: 3000.0,
            },
            dq: DataQuality::Ok,
            ts_ms,
        }
    }

    #[test]
    fn lazily_creates_token_state_on_first_update() {
        let store = RollingStateStore::new();
        assert!(store.with_token("SOL", |_| ()).is_none());
        store.update("SOL", md(1.0, 0));
        assert!(store.with_token("SOL", |_| ()).is_some());
    }

    #[test]
    fn m1h_uses_regular_cadence_index() {
        let store = RollingStateStore::new();
        let count = 70;
        for i in 0..count {
            store.update("SOL", md(1.0 + i as f64 * 0.01, i * ONE_MINUTE_MS));
        }
        let result = store.with_token("SOL", m1h).unwrap();
        // history.len() == count, sample index = count - 60, well within
        // the [50, 70] minute validation window at 1 tick/minute cadence.
        let sample_idx = count - 60;
        let old_price = 1.0 + sample_idx as f64 * 0.01;
        let latest_price = 1.0 + (count - 1) as f64 * 0.01;
        let expected = (latest_price - old_price) / old_price * 100.0;
        assert!((result - expected).abs() < 1e-6);
    }

    #[test]
    fn m1h_falls_back_to_closest_entry_on_irregular_cadence() {
        let store = RollingStateStore::new();
        // Sparse, irregular cadence: samples every 20 minutes.
        for i in 0..10 {
            store.update("SOL", md(1.0 + i as f64, i * 20 * ONE_MINUTE_MS));
        }
        // latest ts = 180min; naive 60-entries-back doesn't exist (only 10
        // entries), so this exercises the closest-to-target fallback.
        let result = store.with_token("SOL", m1h).unwrap();
        // target = 180 - 60 = 120min -> entry index 6 (ts=120min, price=7.0)
        // latest price = 10.0
        assert!((result - ((10.0 - 7.0) / 7.0 * 100.0)).abs() < 1e-6);
    }

    #[test]
    fn m1h_zero_when_insufficient_history() {
        let store = RollingStateStore::new();
        store.update("SOL", md(1.0, 0));
        let result = store.with_token("SOL", m1h).unwrap();
        assert_eq!(result, 0.0);
    }

    #[test]
    fn cleanup_stale_evicts_old_tokens() {
        let store = RollingStateStore::new();
        store.update("OLD", md(1.0, 0));
        store.update("NEW", md(1.0, 100_000_000));
        store.cleanup_stale(100_000_000, 1.0);
        assert!(store.with_token("OLD", |_| ()).is_none());
        assert!(store.with_token("NEW", |_| ()).is_some());
    }

    #[test]
    fn history_bound_evicts_oldest() {
        let store = RollingStateStore::new();
        for i in 0..2000 {
            store.update("SOL", md(1.0, i * ONE_MINUTE_MS));
        }
        let len = store.with_token("SOL", |s| s.history.len()).unwrap();
        assert_eq!(len, crate::model::MAX_HISTORY_LEN);
    }
}

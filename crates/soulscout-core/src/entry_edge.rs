//! Entry/edge evaluator (§4.6): gates a spike-in-progress behind a
//! retest/pullback confirmation pattern, and separately checks that the
//! remaining upside is worth at least twice the round-trip execution cost.

use crate::model::TokenState;
use crate::state_store::m1h;

#[derive(Debug, Clone, PartialEq)]
pub struct EntryConfirmation {
    pub confirmed: bool,
    pub method: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetEdgeCheck {
    pub passes: bool,
    pub upside_pct: f64,
    pub downside_pct: f64,
}

fn min_of(state: &TokenState, skip: usize, take: usize) -> Option<f64> {
    let n = state.history.len();
    if n < skip + take {
        return None;
    }
    state
        .history
        .iter()
        .skip(n - skip)
        .take(take)
        .map(|m| m.price)
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.min(p))))
}

fn max_of(state: &TokenState, skip: usize, take: usize) -> Option<f64> {
    let n = state.history.len();
    if n < skip + take {
        return None;
    }
    state
        .history
        .iter()
        .skip(n - skip)
        .take(take)
        .map(|m| m.price)
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))))
}

/// Retest-and-hold: within the most recent 20 entries, a prior high is
/// found over entries 20-back to 5-back; the last 5 entries trace a
/// pullback with low < 0.98*H; current 5m close > H.
fn check_retest_hold(state: &TokenState) -> Option<EntryConfirmation> {
    let n = state.history.len();
    if n < 20 {
        return None;
    }
    let recent_high = max_of(state, 20, 15)?; // entries [n-20, n-5)
    let pullback_low = min_of(state, 5, 5)?; // entries [n-5, n)
    let confirmed = pullback_low < recent_high * 0.98 && state.latest.bar_5m.c > recent_high;
    Some(EntryConfirmation {
        confirmed,
        method: "retest_hold",
        reason: if confirmed {
            "retest-and-hold pattern confirmed".to_string()
        } else {
            "retest-and-hold pattern not confirmed".to_string()
        },
    })
}

/// Quick pullback: over a 30-entry window, H is the max over entries
/// 30-back to 15-back; L is the min over the most recent 15; pullback pct
/// in [2%, 5%]; current 15m close > H.
fn check_quick_pullback(state: &TokenState) -> Option<EntryConfirmation> {
    let n = state.history.len();
    if n < 30 {
        return None;
    }
    let recent_high = max_of(state, 30, 15)?; // entries [n-30, n-15)
    let pullback_low = min_of(state, 15, 15)?; // entries [n-15, n)
    if recent_high <= 0.0 {
        return None;
    }
    let pullback_pct = (recent_high - pullback_low) / recent_high * 100.0;
    let confirmed = (2.0..=5.0).contains(&pullback_pct) && state.latest.bar_15m.c > recent_high;
    Some(EntryConfirmation {
        confirmed,
        method: "quick_pullback",
        reason: if confirmed {
            "quick-pullback pattern confirmed".to_string()
        } else {
            "quick-pullback pattern not confirmed".to_string()
        },
    })
}

/// Entry confirmation is only required when m1h exceeds +12%; below that
/// the gate is a no-op pass.
pub fn check_entry_confirmation(state: &TokenState) -> EntryConfirmation {
    let h1 = m1h(state);
    if h1 <= 12.0 {
        return EntryConfirmation {
            confirmed: true,
            method: "not_required",
            reason: "m1h within normal range, no confirmation required".to_string(),
        };
    }
    if let Some(result) = check_retest_hold(state) {
        if result.confirmed {
            return result;
        }
    }
    if let Some(result) = check_quick_pullback(state) {
        if result.confirmed {
            return result;
        }
    }
    EntryConfirmation {
        confirmed: false,
        method: "none",
        reason: "awaiting entry confirmation (spike cap)".to_string(),
    }
}

/// Estimates the 24h swing high, capped at 1.15x the latest price.
fn estimate_24h_swing_high(state: &TokenState) -> f64 {
    let max_price = state
        .history
        .iter()
        .map(|m| m.price)
        .fold(f64::MIN, f64::max);
    max_price.min(state.latest.price * 1.15)
}

/// Net-edge check: upside to the 24h swing high (capped at 15%) must be at
/// least twice the round-trip execution cost (spread + impact + a 0.30
/// lag allowance).
pub fn check_net_edge(state: &TokenState) -> NetEdgeCheck {
    let md = &state.latest;
    let swing_high = estimate_24h_swing_high(state);
    let upside_pct = if md.price > 0.0 {
        ((swing_high - md.price) / md.price * 100.0).min(15.0).max(0.0)
    } else {
        0.0
    };
    let downside_pct = md.spread_pct + md.impact_1pct_pct;
    let k = md.spread_pct + md.impact_1pct_pct + 0.30;
    NetEdgeCheck {
        passes: upside_pct >= 2.0 * k,
        upside_pct,
        downside_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bar, DataQuality, MarketUpdate, Route};

    fn md(price: f64, ts_ms: i64) -> MarketUpdate {
        MarketUpdate {
            pool: "pool".into(),
            mint_base: "base".into(),
            mint_quote: "quote".into(),
            price,
            liq_usd: 300_000.0,
            vol24h_usd: 1_200_000.0,
            spread_pct: 0.4,
            impact_1pct_pct: 0.3,
            age_hours: 500.0,
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
                v_usd: 10_000.0,
            },
            bar_15m: Bar {
                o: price,
                h: price,
                l: price,
                c: price,
                v_usd: 30_000.0,
            },
            dq: DataQuality::Ok,
            ts_ms,
        }
    }

    fn state_with_prices(prices: &[f64]) -> TokenState {
        let mut iter = prices.iter();
        let mut state = TokenState::new("SOL", md(*iter.next().unwrap(), 0));
        for (i, p) in iter.enumerate() {
            state.push(md(*p, (i as i64 + 1) * 60_000));
        }
        state
    }

    #[test]
    fn confirmation_not_required_below_threshold() {
        let mut state = state_with_prices(&[1.0]);
        state.push(md(1.05, 60_000)); // m1h small
        let result = check_entry_confirmation(&state);
        assert!(result.confirmed);
        assert_eq!(result.method, "not_required");
    }

    #[test]
    fn net_edge_fails_when_cost_too_high() {
        let mut state = state_with_prices(&[1.0]);
        state.push(md(1.5, 60_000)); // generous swing high potential
        let mut last = state.latest.clone();
        last.spread_pct = 5.0;
        last.impact_1pct_pct = 5.0;
        state.push(last);
        let check = check_net_edge(&state);
        assert!(!check.passes);
    }

    #[test]
    fn net_edge_passes_with_ample_upside_and_low_cost() {
        let mut prices: Vec<f64> = vec![1.0; 5];
        prices.extend(vec![1.2]);
        let mut state = state_with_prices(&[1.0]);
        for p in prices {
            state.push(md(p, state.latest.ts_ms + 60_000));
        }
        let mut last = state.latest.clone();
        last.price = 1.0;
        last.spread_pct = 0.1;
        last.impact_1pct_pct = 0.1;
        state.push(last);
        let check = check_net_edge(&state);
        assert!(check.upside_pct > 0.0);
    }
}

//! Regime detector (§4.5): three market-wide indicators classify the book
//! into RiskOn / RiskOff / Neutral and translate into threshold and size
//! adjustments for the band classifier. Regime adjusts thresholds, not
//! confidence — it never touches `ConfidenceResult`.

use crate::model::{Regime, RegimeAssessment};
use crate::state_store::{m24h, RollingStateStore};

const SOL_SYMBOL: &str = "SOL";

fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    // Middle-index selection, matching the simple (non-averaged) median the
    // upstream system uses for even-length sets.
    Some(values[values.len() / 2])
}

/// Volume-weighted price proxy over a token's full retained history, using
/// 5-minute bar USD volume as weights (§9 design note: preserves the 0.5
/// majority-threshold observable rather than switching to a dedicated
/// 5-minute bar series).
fn above_vwap(store: &RollingStateStore, symbol: &str) -> Option<bool> {
    store.with_token(symbol, |state| {
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for md in &state.history {
            let w = md.bar_5m.v_usd;
            weighted_sum += md.price * w;
            weight_total += w;
        }
        if weight_total <= 0.0 {
            return None;
        }
        let vwap_proxy = weighted_sum / weight_total;
        Some(state.latest.price > vwap_proxy)
    })
    .flatten()
}

/// Assesses the current regime from a snapshot of the state store.
pub fn assess_regime(store: &RollingStateStore) -> RegimeAssessment {
    let sol_positive = store.with_token(SOL_SYMBOL, m24h).map(|r| r > 0.0).unwrap_or(false);

    let symbols = store.symbols();
    let returns: Vec<f64> = symbols
        .iter()
        .filter_map(|sym| store.with_token(sym, m24h))
        .collect();
    let median_positive = median(returns).map(|m| m > 0.0).unwrap_or(false);

    let (above_count, total) = symbols.iter().fold((0usize, 0usize), |(above, total), sym| {
        match above_vwap(store, sym) {
            Some(true) => (above + 1, total + 1),
            Some(false) => (above, total + 1),
            None => (above, total),
        }
    });
    let ratio = if total == 0 {
        0.5
    } else {
        above_count as f64 / total as f64
    };
    let above_vwap_majority = ratio > 0.5;

    let k = [sol_positive, median_positive, above_vwap_majority]
        .iter()
        .filter(|b| **b)
        .count();

    let (regime, threshold_adjustment, size_adjustment_pct) = if k >= 2 {
        (Regime::RiskOn, -10, 30)
    } else if k == 0 {
        (Regime::RiskOff, 10, -30)
    } else {
        (Regime::Neutral, 0, 0)
    };

    RegimeAssessment {
        regime,
        sol_positive,
        median_positive,
        above_vwap_majority,
        threshold_adjustment,
        size_adjustment_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bar, DataQuality, MarketUpdate, Route};

    fn md(symbol_price: f64, ts_ms: i64, vol: f64) -> MarketUpdate {
        MarketUpdate {
            pool: "pool".into(),
            mint_base: "base".into(),
            mint_quote: "quote".into(),
            price: symbol_price,
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
                o: symbol_price,
                h: symbol_price,
                l: symbol_price,
                c: symbol_price,
                v_usd: vol,
            },
            bar_15m: Bar {
                o: symbol_price,
                h: symbol_price,
                l: symbol_price,
                c: symbol_price,
                v_usd: vol * 3.0,
            },
            dq: DataQuality::Ok,
            ts_ms,
        }
    }

    #[test]
    fn risk_on_when_two_or_more_indicators_positive() {
        let store = RollingStateStore::new();
        // SOL rising
        store.update("SOL", md(1.0, 0, 1000.0));
        store.update("SOL", md(1.5, 24 * 3_600_000, 1000.0));
        // Another token rising too, for the median
        store.update("TOK", md(1.0, 0, 1000.0));
        store.update("TOK", md(1.3, 24 * 3_600_000, 1000.0));

        let assessment = assess_regime(&store);
        assert!(assessment.sol_positive);
        assert!(assessment.median_positive);
        assert_eq!(assessment.regime, Regime::RiskOn);
        assert_eq!(assessment.threshold_adjustment, -10);
        assert_eq!(assessment.size_adjustment_pct, 30);
    }

    #[test]
    fn risk_off_when_no_indicators_positive() {
        let store = RollingStateStore::new();
        store.update("SOL", md(1.0, 0, 1000.0));
        store.update("SOL", md(0.5, 24 * 3_600_000, 1000.0));
        store.update("TOK", md(1.0, 0, 1000.0));
        store.update("TOK", md(0.4, 24 * 3_600_000, 1000.0));

        let assessment = assess_regime(&store);
        assert!(!assessment.sol_positive);
        assert!(!assessment.median_positive);
        assert_eq!(assessment.regime, Regime::RiskOff);
        assert_eq!(assessment.threshold_adjustment, 10);
        assert_eq!(assessment.size_adjustment_pct, -30);
    }

    #[test]
    fn empty_store_defaults_to_neutral_leaning_risk_off() {
        let store = RollingStateStore::new();
        let assessment = assess_regime(&store);
        // No symbols at all: every indicator is false/neutral -> k == 0.
        assert_eq!(assessment.regime, Regime::RiskOff);
    }
}

//! Signal calculator (§4.3): ten [0,1] scores plus list hygiene, derived
//! purely from a `MarketUpdate` and/or its `TokenState` history. Any signal
//! with insufficient history returns 0.5 (neutral) rather than failing.

use crate::model::{ListHygiene, MarketUpdate, SignalScores, TokenState};
use crate::state_store::{m1h, m24h};

const NEUTRAL: f64 = 0.5;

/// Liquidity floor checks: below 25k is untradeable, below 150k is
/// heads-up-only.
fn s1_liquidity(md: &MarketUpdate) -> f64 {
    if md.liq_usd < 25_000.0 {
        0.0
    } else if md.liq_usd < 150_000.0 {
        0.5
    } else {
        1.0
    }
}

fn s2_volume(md: &MarketUpdate) -> f64 {
    if md.vol24h_usd < 50_000.0 {
        0.0
    } else if md.vol24h_usd < 500_000.0 {
        0.5
    } else {
        1.0
    }
}

/// FDV/Liq ratio. The upstream system this pipeline derives from never
/// carries a real FDV field through `MarketUpdate` (it's a constant
/// placeholder there too); `fdv_liq_ratio` is accepted as an optional
/// out-of-band input and the signal falls back to the neutral band-center
/// value of the ratio's "good" range when it isn't known.
fn s3_fdv_liq(fdv_liq_ratio: Option<f64>) -> f64 {
    let Some(r) = fdv_liq_ratio else {
        return 1.0; // unknown ratio treated as the healthy default band
    };
    if (5.0..=50.0).contains(&r) {
        1.0
    } else if r < 2.0 {
        0.4
    } else if r > 150.0 {
        0.3
    } else if r < 5.0 {
        // linear interpolation between (2, 0.4) and (5, 1.0)
        lerp(r, 2.0, 5.0, 0.4, 1.0)
    } else {
        // r in (50, 150]: interpolate between (50, 1.0) and (150, 0.3)
        lerp(r, 50.0, 150.0, 1.0, 0.3)
    }
}

fn lerp(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    if (x1 - x0).abs() < f64::EPSILON {
        return y0;
    }
    let t = (x - x0) / (x1 - x0);
    y0 + t * (y1 - y0)
}

fn momentum_component(m: f64, mid_lo: f64, mid_hi: f64) -> f64 {
    if m >= mid_lo && m <= mid_hi {
        0.25
    } else if m > mid_hi {
        0.10
    } else if m < 0.0 {
        -0.20
    } else {
        0.0
    }
}

/// S4 momentum: single base score of 0.5, adjusted additively by both the
/// m1h-shaped and m24h-shaped legs, clamped once.
fn s4_momentum(state: &TokenState) -> f64 {
    let score = 0.5 + momentum_component(m1h(state), 1.0, 12.0) + momentum_component(m24h(state), 2.0, 60.0);
    score.clamp(0.0, 1.0)
}

/// S5 structure: compares the low of the most recent 10 entries against the
/// low of the prior 10 (offset 10-20 back).
fn s5_structure(state: &TokenState) -> f64 {
    let hist = &state.history;
    let n = hist.len();
    if n < 20 {
        return NEUTRAL;
    }
    let recent_low = hist
        .iter()
        .skip(n - 10)
        .map(|m| m.price)
        .fold(f64::MAX, f64::min);
    let prior_low = hist
        .iter()
        .skip(n - 20)
        .take(10)
        .map(|m| m.price)
        .fold(f64::MAX, f64::min);
    if prior_low <= 0.0 {
        return NEUTRAL;
    }
    if recent_low > prior_low * 1.02 {
        0.9
    } else if recent_low < prior_low * 0.98 {
        0.3
    } else {
        0.6
    }
}

/// S6 volatility: coefficient of variation of the last 60 entries' prices.
fn s6_volatility(state: &TokenState) -> f64 {
    let hist = &state.history;
    let n = hist.len();
    if n < 60 {
        return NEUTRAL;
    }
    let prices: Vec<f64> = hist.iter().skip(n - 60).map(|m| m.price).collect();
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;
    if mean <= 0.0 {
        return NEUTRAL;
    }
    let variance =
        prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / prices.len() as f64;
    let cv = variance.sqrt() / mean;
    if cv < 0.05 {
        0.9
    } else if cv > 0.20 {
        0.3
    } else {
        0.7
    }
}

fn s7_rug_risk(md: &MarketUpdate) -> f64 {
    if md.age_hours < 24.0 {
        0.3
    } else if md.age_hours < 72.0 {
        0.6
    } else {
        0.9
    }
}

fn s8_execution(md: &MarketUpdate) -> f64 {
    if md.spread_pct > 2.5 || md.impact_1pct_pct > 1.5 {
        return 0.0;
    }
    (1.0 - 0.3 * (md.spread_pct / 2.5) - 0.3 * (md.impact_1pct_pct / 1.5)).max(0.0)
}

/// S9 volume trend: sum of v_usd over the last 50 entries vs the prior 50.
fn s9_volume_trend(state: &TokenState) -> f64 {
    let hist = &state.history;
    let n = hist.len();
    if n < 100 {
        return NEUTRAL;
    }
    let recent: f64 = hist.iter().skip(n - 50).map(|m| m.bar_5m.v_usd).sum();
    let prior: f64 = hist
        .iter()
        .skip(n - 100)
        .take(50)
        .map(|m| m.bar_5m.v_usd)
        .sum();
    if prior <= 0.0 {
        return NEUTRAL;
    }
    let ratio = recent / prior;
    if ratio > 1.2 {
        0.9
    } else if ratio < 0.8 {
        0.4
    } else {
        0.6
    }
}

fn s10_route(md: &MarketUpdate) -> f64 {
    if !md.route.ok || md.route.hops > 3 {
        return 0.0;
    }
    (1.0 - 0.15 * (md.route.hops as f64 - 1.0) - 0.3 * md.route.deviation_pct).max(0.0)
}

/// Computes all ten signals plus N1 for the given token state. `fdv_liq_ratio`
/// is accepted separately since no `MarketUpdate` field carries it (see
/// `s3_fdv_liq`).
pub fn compute_signals(
    state: &TokenState,
    list_hygiene: ListHygiene,
    fdv_liq_ratio: Option<f64>,
) -> SignalScores {
    let md = &state.latest;
    SignalScores {
        s1: s1_liquidity(md),
        s2: s2_volume(md),
        s3: s3_fdv_liq(fdv_liq_ratio),
        s4: s4_momentum(state),
        s5: s5_structure(state),
        s6: s6_volatility(state),
        s7: s7_rug_risk(md),
        s8: s8_execution(md),
        s9: s9_volume_trend(state),
        s10: s10_route(md),
        n1: list_hygiene,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bar, DataQuality, Route};

    fn base_md(price: f64, ts_ms: i64) -> MarketUpdate {
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

    #[test]
    fn s1_liquidity_thresholds() {
        let mut md = base_md(1.0, 0);
        md.liq_usd = 10_000.0;
        assert_eq!(s1_liquidity(&md), 0.0);
        md.liq_usd = 80_000.0;
        assert_eq!(s1_liquidity(&md), 0.5);
        md.liq_usd = 300_000.0;
        assert_eq!(s1_liquidity(&md), 1.0);
    }

    #[test]
    fn s2_volume_thresholds() {
        let mut md = base_md(1.0, 0);
        md.vol24h_usd = 10_000.0;
        assert_eq!(s2_volume(&md), 0.0);
        md.vol24h_usd = 250_000.0;
        assert_eq!(s2_volume(&md), 0.5);
        md.vol24h_usd = 1_200_000.0;
        assert_eq!(s2_volume(&md), 1.0);
    }

    #[test]
    fn s3_fdv_liq_bands() {
        assert_eq!(s3_fdv_liq(Some(20.0)), 1.0);
        assert_eq!(s3_fdv_liq(Some(1.0)), 0.4);
        assert_eq!(s3_fdv_liq(Some(200.0)), 0.3);
        assert_eq!(s3_fdv_liq(None), 1.0);
        let mid = s3_fdv_liq(Some(3.5));
        assert!(mid > 0.4 && mid < 1.0);
    }

    #[test]
    fn s7_rug_risk_age_bands() {
        let mut md = base_md(1.0, 0);
        md.age_hours = 2.0;
        assert_eq!(s7_rug_risk(&md), 0.3);
        md.age_hours = 48.0;
        assert_eq!(s7_rug_risk(&md), 0.6);
        md.age_hours = 500.0;
        assert_eq!(s7_rug_risk(&md), 0.9);
    }

    #[test]
    fn s8_execution_hard_gate() {
        let mut md = base_md(1.0, 0);
        md.spread_pct = 3.0;
        assert_eq!(s8_execution(&md), 0.0);
        md.spread_pct = 0.4;
        md.impact_1pct_pct = 2.0;
        assert_eq!(s8_execution(&md), 0.0);
        md.impact_1pct_pct = 0.3;
        assert!(s8_execution(&md) > 0.5);
    }

    #[test]
    fn s10_route_gate_and_formula() {
        let mut md = base_md(1.0, 0);
        md.route.ok = false;
        assert_eq!(s10_route(&md), 0.0);
        md.route.ok = true;
        md.route.hops = 5;
        assert_eq!(s10_route(&md), 0.0);
        md.route.hops = 2;
        md.route.deviation_pct = 0.1;
        assert!((s10_route(&md) - (1.0 - 0.15 - 0.03)).abs() < 1e-9);
    }

    #[test]
    fn insufficient_history_signals_are_neutral() {
        let state = TokenState::new("SOL", base_md(1.0, 0));
        let scores = compute_signals(&state, ListHygiene::Normal, None);
        assert_eq!(scores.s5, NEUTRAL);
        assert_eq!(scores.s6, NEUTRAL);
        assert_eq!(scores.s9, NEUTRAL);
    }

    #[test]
    fn n1_list_hygiene_values() {
        assert_eq!(ListHygiene::Normal.value(), 1.0);
        assert_eq!(ListHygiene::Low.value(), 0.9);
    }
}

//! Confidence scorer (§4.4): weighted sum of the ten signals, discounted by
//! a data-quality penalty, capped by the rug-risk gate, and reduced by a
//! handful of flat penalties. Pure and deterministic.

use crate::model::{Bar, ConfidenceResult, MarketUpdate, SignalScores};

/// Default per-signal weights, S1..S10, in order. Sums to 1.0.
pub const DEFAULT_WEIGHTS: [f64; 10] = [0.15, 0.12, 0.08, 0.18, 0.10, 0.08, 0.12, 0.10, 0.05, 0.02];

#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub weights: [f64; 10],
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
        }
    }
}

impl ScoringWeights {
    /// Rejects malformed weight sets (sum <= 0), per §4.4.
    pub fn validate(&self) -> Result<(), crate::error::CoreError> {
        let sum: f64 = self.weights.iter().sum();
        if sum <= 0.0 {
            return Err(crate::error::CoreError::Config(format!(
                "scoring weights sum to {sum}, must be > 0"
            )));
        }
        Ok(())
    }
}

fn bar_missing(bar: &Bar) -> bool {
    bar.is_missing()
}

/// Computes raw score, data quality, penalties, and the final confidence,
/// given the signal scores and the market update they were derived from.
pub fn compute_confidence(
    scores: &SignalScores,
    md: &MarketUpdate,
    weights: &ScoringWeights,
) -> ConfidenceResult {
    let s = scores.weighted();
    let raw_score = 100.0 * s.iter().zip(weights.weights.iter()).map(|(si, wi)| si * wi).sum::<f64>();

    let mut dq = 1.0_f64;
    let mut reasons = Vec::new();
    if scores.s1 < 0.1 {
        dq -= 0.08;
        reasons.push("S1 (liquidity) below 0.1".to_string());
    }
    if scores.s2 < 0.1 {
        dq -= 0.08;
        reasons.push("S2 (volume) below 0.1".to_string());
    }
    if scores.s4 < 0.1 {
        dq -= 0.08;
        reasons.push("S4 (momentum) below 0.1".to_string());
    }
    if bar_missing(&md.bar_5m) {
        dq -= 0.08;
        reasons.push("5m bar missing".to_string());
    }
    if bar_missing(&md.bar_15m) {
        dq -= 0.08;
        reasons.push("15m bar missing".to_string());
    }
    if md.dq == crate::model::DataQuality::Degraded {
        dq -= 0.08;
        reasons.push("incoming data tagged degraded".to_string());
    }
    let dq_forced_headsup = dq < 0.7;
    if dq_forced_headsup {
        reasons.push(format!("data quality {dq:.2} forces heads-up"));
    }

    let rug_cap_applied = scores.s7 < 0.3;
    let raw_score = if rug_cap_applied {
        reasons.push("S7 (rug risk) below 0.3: score capped at 55".to_string());
        raw_score.min(55.0)
    } else {
        raw_score
    };

    let young_and_risky = md.age_hours < 72.0 && scores.s7 < 0.6;
    if young_and_risky {
        reasons.push("token young and risky (age < 72h, S7 < 0.6)".to_string());
    }

    let mut penalties = 0.0_f64;
    if md.age_hours < 24.0 {
        penalties += 15.0;
        reasons.push("age < 24h: +15 penalty".to_string());
    } else if md.age_hours < 48.0 {
        penalties += 5.0;
        reasons.push("age < 48h: +5 penalty".to_string());
    }
    if md.spread_pct > 1.5 {
        penalties += 5.0;
        reasons.push("spread > 1.5%: +5 penalty".to_string());
    }
    if md.impact_1pct_pct > 1.0 {
        penalties += 5.0;
        reasons.push("impact > 1.0%: +5 penalty".to_string());
    }
    if scores.s9 < 0.5 {
        penalties += 3.0;
        reasons.push("S9 (volume trend) below 0.5: +3 penalty".to_string());
    }
    if scores.n1.value() < 1.0 {
        penalties += 10.0;
        reasons.push("N1 (list hygiene) below 1.0: +10 penalty".to_string());
    }

    let final_confidence = (raw_score - penalties).max(0.0);

    ConfidenceResult {
        raw_score,
        data_quality: dq.max(0.0),
        penalties,
        final_confidence,
        rug_cap_applied,
        young_and_risky,
        dq_forced_headsup,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataQuality, ListHygiene, Route};

    fn md(age_hours: f64) -> MarketUpdate {
        MarketUpdate {
            pool: "pool".into(),
            mint_base: "base".into(),
            mint_quote: "quote".into(),
            price: 1.0,
            liq_usd: 300_000.0,
            vol24h_usd: 1_200_000.0,
            spread_pct: 0.4,
            impact_1pct_pct: 0.3,
            age_hours,
            route: Route {
                ok: true,
                hops: 1,
                deviation_pct: 0.0,
            },
            bar_5m: Bar {
                o: 1.0,
                h: 1.0,
                l: 1.0,
                c: 1.0,
                v_usd: 10_000.0,
            },
            bar_15m: Bar {
                o: 1.0,
                h: 1.0,
                l: 1.0,
                c: 1.0,
                v_usd: 30_000.0,
            },
            dq: DataQuality::Ok,
            ts_ms: 0,
        }
    }

    fn strong_scores() -> SignalScores {
        SignalScores {
            s1: 1.0,
            s2: 1.0,
            s3: 1.0,
            s4: 1.0,
            s5: 0.9,
            s6: 0.9,
            s7: 0.9,
            s8: 1.0,
            s9: 0.9,
            s10: 1.0,
            n1: ListHygiene::Normal,
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let sum: f64 = DEFAULT_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_weight_sum() {
        let weights = ScoringWeights { weights: [0.0; 10] };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn actionable_candidate_scores_high() {
        let scores = strong_scores();
        let market = md(500.0);
        let result = compute_confidence(&scores, &market, &ScoringWeights::default());
        assert!(result.final_confidence >= 70.0);
        assert!(!result.rug_cap_applied);
        assert!(!result.dq_forced_headsup);
    }

    #[test]
    fn rug_cap_limits_raw_score() {
        let mut scores = strong_scores();
        scores.s7 = 0.2; // triggers rug cap
        let market = md(2.0); // also young
        let result = compute_confidence(&scores, &market, &ScoringWeights::default());
        assert!(result.rug_cap_applied);
        assert!(result.raw_score <= 55.0);
    }

    #[test]
    fn degraded_incoming_tag_forces_heads_up() {
        let scores = strong_scores();
        let mut market = md(500.0);
        market.dq = DataQuality::Degraded;
        market.bar_5m.v_usd = 0.0;
        market.bar_15m.v_usd = 0.0;
        let result = compute_confidence(&scores, &market, &ScoringWeights::default());
        assert!(result.dq_forced_headsup);
        assert!(result.data_quality <= 0.68);
    }

    #[test]
    fn n1_penalty_applied_when_below_one() {
        let mut scores = strong_scores();
        scores.n1 = ListHygiene::Low;
        let market = md(500.0);
        let result = compute_confidence(&scores, &market, &ScoringWeights::default());
        assert!(result.penalties >= 10.0);
    }
}

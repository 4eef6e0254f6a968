//! The hot-path pipeline (§2 data flow): ticks -> bars -> state update ->
//! signals -> confidence -> regime adjustment -> entry/edge gates -> band ->
//! throttle -> publish. `process_update` is the single function every
//! analytics worker calls per incoming `MarketUpdate`; it has no side
//! effects beyond mutating the state store and throttle ledger it's given.

use crate::band::{self, BandInputs};
use crate::entry_edge;
use crate::model::{AlertRecord, Band, ListHygiene, MarketUpdate};
use crate::scoring::{self, ScoringWeights};
use crate::signals;
use crate::state_store::RollingStateStore;
use crate::throttle::{ThrottleLedger, ThrottleReject};

pub struct PipelineConfig {
    pub base_threshold: f64,
    pub weights: ScoringWeights,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_threshold: band::DEFAULT_BASE_THRESHOLD,
            weights: ScoringWeights::default(),
        }
    }
}

/// Outcome of running one update through the pipeline: either an admitted
/// alert or the reason it was not published.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Admitted(AlertRecord),
    NoBand,
    Throttled(ThrottleReject),
}

/// Runs one `MarketUpdate` for `symbol` through the full decision pipeline.
/// `regime` is a snapshot of the state-store-wide regime assessment (the
/// caller recomputes it periodically, not per update, since it's a
/// cross-token aggregate).
#[allow(clippy::too_many_arguments)]
pub fn process_update(
    store: &RollingStateStore,
    throttle: &ThrottleLedger,
    config: &PipelineConfig,
    symbol: &str,
    md: MarketUpdate,
    list_hygiene: ListHygiene,
    fdv_liq_ratio: Option<f64>,
    regime: &crate::model::RegimeAssessment,
    now_ms: i64,
    corr_id: impl Into<String>,
) -> PipelineOutcome {
    let md = md.normalize_quality();
    store.update(symbol, md);

    let Some((alert_record, band)) = store.with_token(symbol, |state| {
        let scores = signals::compute_signals(state, list_hygiene, fdv_liq_ratio);
        let confidence = scoring::compute_confidence(&scores, &state.latest, &config.weights);
        let entry = entry_edge::check_entry_confirmation(state);
        let net_edge = entry_edge::check_net_edge(state);

        let band = band::classify(&BandInputs {
            confidence: &confidence,
            regime,
            entry_confirmed: entry.confirmed,
            net_edge_passes: net_edge.passes,
            base_threshold: config.base_threshold,
        });

        if band == Band::None {
            return (None, band);
        }

        let mut record = crate::alert::build_alert(state, band, &confidence, corr_id.into());
        if !entry.confirmed {
            record.lines.push(entry.reason.clone());
        }
        if !net_edge.passes {
            record.lines.push(format!(
                "net edge failed: upside {:.1}% vs cost gate",
                net_edge.upside_pct
            ));
        }
        (Some(record), band)
    })
    .flatten_pair() else {
        return PipelineOutcome::NoBand;
    };

    match throttle.check_and_record(symbol, band, &alert_record.lines, now_ms) {
        Ok(()) => PipelineOutcome::Admitted(alert_record),
        Err(reject) => PipelineOutcome::Throttled(reject),
    }
}

/// Small helper trait to turn `Option<(Option<AlertRecord>, Band)>` into
/// `Option<(AlertRecord, Band)>`, since `with_token` always returns
/// `Some(..)` once the symbol exists (it was just inserted above) but the
/// inner tuple's first element may still be `None` when the band is
/// `None`.
trait FlattenPair {
    fn flatten_pair(self) -> Option<(AlertRecord, Band)>;
}

impl FlattenPair for Option<(Option<AlertRecord>, Band)> {
    fn flatten_pair(self) -> Option<(AlertRecord, Band)> {
        self.and_then(|(record, band)| record.map(|r| (r, band)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bar, DataQuality, Regime, RegimeAssessment, Route};

    fn strong_md(price: f64, ts_ms: i64) -> MarketUpdate {
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

    fn neutral_regime() -> RegimeAssessment {
        RegimeAssessment {
            regime: Regime::Neutral,
            sol_positive: false,
            median_positive: false,
            above_vwap_majority: false,
            threshold_adjustment: 0,
            size_adjustment_pct: 0,
        }
    }

    #[test]
    fn thin_liquidity_caps_at_heads_up() {
        let store = RollingStateStore::new();
        let throttle = ThrottleLedger::new(crate::throttle::ThrottleConfig::default());
        let config = PipelineConfig::default();
        let regime = neutral_regime();

        let mut md = strong_md(1.0, 0);
        md.liq_usd = 80_000.0; // heads-up-only liquidity band
        md.vol24h_usd = 250_000.0;
        md.age_hours = 200.0;

        let outcome = process_update(
            &store,
            &throttle,
            &config,
            "THIN",
            md,
            ListHygiene::Normal,
            None,
            &regime,
            0,
            "corr-1",
        );
        match outcome {
            PipelineOutcome::Admitted(alert) => {
                assert_eq!(alert.band, Band::HeadsUp);
            }
            other => panic!("expected an admitted heads_up alert, got {other:?}"),
        }
    }

    #[test]
    fn no_band_when_everything_weak() {
        let store = RollingStateStore::new();
        let throttle = ThrottleLedger::new(crate::throttle::ThrottleConfig::default());
        let config = PipelineConfig::default();
        let regime = neutral_regime();

        let mut md = strong_md(1.0, 0);
        md.liq_usd = 5_000.0;
        md.vol24h_usd = 1_000.0;
        md.age_hours = 1.0;
        md.spread_pct = 5.0;
        md.impact_1pct_pct = 5.0;
        md.route.ok = false;

        let outcome = process_update(
            &store,
            &throttle,
            &config,
            "WEAK",
            md,
            ListHygiene::Low,
            None,
            &regime,
            0,
            "corr-2",
        );
        assert_eq!(outcome, PipelineOutcome::NoBand);
    }

    #[test]
    fn repeated_admission_within_cooldown_is_throttled() {
        let store = RollingStateStore::new();
        let throttle = ThrottleLedger::new(crate::throttle::ThrottleConfig::default());
        let config = PipelineConfig::default();
        let regime = neutral_regime();

        let md1 = strong_md(1.0, 0);
        let first = process_update(
            &store,
            &throttle,
            &config,
            "SOLX",
            md1,
            ListHygiene::Normal,
            None,
            &regime,
            0,
            "corr-3",
        );
        assert!(matches!(first, PipelineOutcome::Admitted(_)));

        let md2 = strong_md(1.01, 1000);
        let second = process_update(
            &store,
            &throttle,
            &config,
            "SOLX",
            md2,
            ListHygiene::Normal,
            None,
            &regime,
            1000,
            "corr-4",
        );
        assert!(matches!(second, PipelineOutcome::Throttled(_)));
    }
}

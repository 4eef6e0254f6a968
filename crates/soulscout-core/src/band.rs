//! Band classifier (§4.7): the first-match-wins decision table mapping
//! confidence, data-quality/rug flags, entry/edge gates, and the regime
//! threshold adjustment onto a discrete alert band.

use crate::model::{Band, ConfidenceResult, RegimeAssessment};

/// Default base threshold for `actionable`, before the regime adjustment.
pub const DEFAULT_BASE_THRESHOLD: f64 = 70.0;

pub struct BandInputs<'a> {
    pub confidence: &'a ConfidenceResult,
    pub regime: &'a RegimeAssessment,
    pub entry_confirmed: bool,
    pub net_edge_passes: bool,
    pub base_threshold: f64,
}

/// Applies the §4.7 decision table, first rule wins.
pub fn classify(inputs: &BandInputs) -> Band {
    let c = inputs.confidence.final_confidence;

    // Rule 1/2: DQ-forced heads-up.
    if inputs.confidence.dq_forced_headsup {
        return if c >= 60.0 { Band::HeadsUp } else { Band::None };
    }

    // Rule 3: entry not confirmed or net-edge failed.
    if !inputs.entry_confirmed || !inputs.net_edge_passes {
        return if c >= 60.0 { Band::HeadsUp } else { Band::None };
    }

    // Rule 4: high conviction.
    if c >= 85.0 && !inputs.confidence.rug_cap_applied && !inputs.confidence.young_and_risky {
        return Band::HighConviction;
    }

    // Rule 5: actionable, threshold adjusted by regime.
    let threshold = inputs.base_threshold + inputs.regime.threshold_adjustment as f64;
    if c >= threshold {
        return Band::Actionable;
    }

    // Rule 6: heads-up floor.
    if c >= 60.0 {
        return Band::HeadsUp;
    }

    // Rule 7: otherwise.
    Band::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Regime;

    fn confidence(final_confidence: f64) -> ConfidenceResult {
        ConfidenceResult {
            raw_score: final_confidence,
            data_quality: 1.0,
            penalties: 0.0,
            final_confidence,
            rug_cap_applied: false,
            young_and_risky: false,
            dq_forced_headsup: false,
            reasons: vec![],
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
    fn dq_forced_headsup_splits_on_sixty() {
        let regime = neutral_regime();
        let mut conf = confidence(65.0);
        conf.dq_forced_headsup = true;
        let band = classify(&BandInputs {
            confidence: &conf,
            regime: &regime,
            entry_confirmed: true,
            net_edge_passes: true,
            base_threshold: DEFAULT_BASE_THRESHOLD,
        });
        assert_eq!(band, Band::HeadsUp);

        let mut conf = confidence(50.0);
        conf.dq_forced_headsup = true;
        let band = classify(&BandInputs {
            confidence: &conf,
            regime: &regime,
            entry_confirmed: true,
            net_edge_passes: true,
            base_threshold: DEFAULT_BASE_THRESHOLD,
        });
        assert_eq!(band, Band::None);
    }

    #[test]
    fn entry_not_confirmed_downgrades_regardless_of_confidence() {
        let regime = neutral_regime();
        let conf = confidence(95.0);
        let band = classify(&BandInputs {
            confidence: &conf,
            regime: &regime,
            entry_confirmed: false,
            net_edge_passes: true,
            base_threshold: DEFAULT_BASE_THRESHOLD,
        });
        assert_eq!(band, Band::HeadsUp);
    }

    #[test]
    fn high_conviction_requires_no_rug_cap_or_young_risky() {
        let regime = neutral_regime();
        let conf = confidence(90.0);
        let band = classify(&BandInputs {
            confidence: &conf,
            regime: &regime,
            entry_confirmed: true,
            net_edge_passes: true,
            base_threshold: DEFAULT_BASE_THRESHOLD,
        });
        assert_eq!(band, Band::HighConviction);

        let mut conf = confidence(90.0);
        conf.rug_cap_applied = true;
        let band = classify(&BandInputs {
            confidence: &conf,
            regime: &regime,
            entry_confirmed: true,
            net_edge_passes: true,
            base_threshold: DEFAULT_BASE_THRESHOLD,
        });
        assert_eq!(band, Band::Actionable);
    }

    #[test]
    fn actionable_threshold_moves_with_regime() {
        let mut regime = neutral_regime();
        regime.threshold_adjustment = -10; // risk-on
        let conf = confidence(62.0);
        let band = classify(&BandInputs {
            confidence: &conf,
            regime: &regime,
            entry_confirmed: true,
            net_edge_passes: true,
            base_threshold: DEFAULT_BASE_THRESHOLD,
        });
        assert_eq!(band, Band::Actionable);
    }

    #[test]
    fn below_sixty_with_all_gates_clear_is_none() {
        let regime = neutral_regime();
        let conf = confidence(40.0);
        let band = classify(&BandInputs {
            confidence: &conf,
            regime: &regime,
            entry_confirmed: true,
            net_edge_passes: true,
            base_threshold: DEFAULT_BASE_THRESHOLD,
        });
        assert_eq!(band, Band::None);
    }
}

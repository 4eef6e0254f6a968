//! Alert builder (§4.9): assembles a publish-ready `AlertRecord` from an
//! admitted update's confidence, signal, and route context.

use crate::model::{AlertRecord, Band, ConfidenceResult, Route, TokenState};

pub const DEFAULT_EXIT_PLAN: &str = "Trim 25% at +15%; 25% at +30%; trail rest";

/// Renders a human-readable path-to-quote descriptor from a route, with an
/// estimated impact suffix when the route isn't a direct hop.
fn describe_route(route: &Route, est_impact_pct: f64) -> String {
    if !route.ok {
        return "no route to SOL found".to_string();
    }
    if route.hops <= 1 {
        "direct to SOL".to_string()
    } else {
        format!(
            "{} hops to SOL (est impact {:.1}%)",
            route.hops, est_impact_pct
        )
    }
}

/// Builds the ordered, human-readable reason lines for an alert: the
/// confidence scorer's own reasons, prefixed by a headline confidence line.
fn build_reason_lines(confidence: &ConfidenceResult) -> Vec<String> {
    let mut lines = vec![format!(
        "confidence {:.0} (raw {:.1}, penalties {:.1}, dq {:.2})",
        confidence.final_confidence, confidence.raw_score, confidence.penalties, confidence.data_quality
    )];
    lines.extend(confidence.reasons.iter().cloned());
    lines
}

/// Assembles the alert record for an admitted update. `corr_id` should be a
/// fresh identifier per alert (callers typically use a UUID v4).
pub fn build_alert(
    state: &TokenState,
    band: Band,
    confidence: &ConfidenceResult,
    corr_id: String,
) -> AlertRecord {
    let md = &state.latest;
    AlertRecord {
        band,
        symbol: state.symbol.clone(),
        price: md.price,
        confidence: confidence.final_confidence.round() as i32,
        lines: build_reason_lines(confidence),
        plan: DEFAULT_EXIT_PLAN.to_string(),
        sol_path: describe_route(&md.route, md.impact_1pct_pct),
        est_impact_pct: md.impact_1pct_pct,
        corr_id,
        ts_ms: md.ts_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bar, DataQuality, MarketUpdate};

    fn state() -> TokenState {
        let md = MarketUpdate {
            pool: "pool".into(),
            mint_base: "base".into(),
            mint_quote: "quote".into(),
            price: 1.23,
            liq_usd: 300_000.0,
            vol24h_usd: 1_200_000.0,
            spread_pct: 0.4,
            impact_1pct_pct: 0.3,
            age_hours: 500.0,
            route: Route {
                ok: true,
                hops: 2,
                deviation_pct: 0.01,
            },
            bar_5m: Bar {
                o: 1.2,
                h: 1.25,
                l: 1.19,
                c: 1.23,
                v_usd: 10_000.0,
            },
            bar_15m: Bar {
                o: 1.2,
                h: 1.26,
                l: 1.18,
                c: 1.23,
                v_usd: 30_000.0,
            },
            dq: DataQuality::Ok,
            ts_ms: 123_456,
        };
        TokenState::new("SOLSCOUT", md)
    }

    fn confidence() -> ConfidenceResult {
        ConfidenceResult {
            raw_score: 80.0,
            data_quality: 1.0,
            penalties: 5.0,
            final_confidence: 75.0,
            rug_cap_applied: false,
            young_and_risky: false,
            dq_forced_headsup: false,
            reasons: vec!["spread > 1.5%: +5 penalty".to_string()],
        }
    }

    #[test]
    fn builds_alert_with_default_exit_plan() {
        let alert = build_alert(&state(), Band::Actionable, &confidence(), "corr-1".to_string());
        assert_eq!(alert.plan, DEFAULT_EXIT_PLAN);
        assert_eq!(alert.symbol, "SOLSCOUT");
        assert_eq!(alert.confidence, 75);
        assert_eq!(alert.corr_id, "corr-1");
    }

    #[test]
    fn multi_hop_route_mentions_estimated_impact() {
        let alert = build_alert(&state(), Band::HeadsUp, &confidence(), "corr-2".to_string());
        assert!(alert.sol_path.contains("hops"));
        assert!(alert.sol_path.contains("0.3"));
    }

    #[test]
    fn reason_lines_lead_with_confidence_summary() {
        let alert = build_alert(&state(), Band::Actionable, &confidence(), "corr-3".to_string());
        assert!(alert.lines[0].contains("confidence 75"));
        assert_eq!(alert.lines.len(), 2);
    }
}

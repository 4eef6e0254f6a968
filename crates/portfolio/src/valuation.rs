//! Holding valuation (§8 Portfolio), ported 1:1 from
//! `original_source/portfolio/src/valuation.{hpp,cpp}`.

use serde::{Deserialize, Serialize};

/// How a holding's USD price was obtained, in cascade priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValuationTag {
    /// Priced via the CoinGecko-equivalent aggregator.
    Cg,
    /// Priced via a DEX pool with liquidity >= $75k.
    Dex,
    /// Priced via a DEX pool with liquidity in [$25k, $75k); haircut applied.
    Est50,
    /// Could not be priced by any source.
    Na,
}

impl std::fmt::Display for ValuationTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValuationTag::Cg => "CG",
            ValuationTag::Dex => "DEX",
            ValuationTag::Est50 => "EST_50",
            ValuationTag::Na => "NA",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub mint: String,
    pub symbol: String,
    pub amount: f64,
    pub usd_price: Option<f64>,
    pub usd_value: Option<f64>,
    pub tag: ValuationTag,
}

impl Holding {
    pub fn unpriced(mint: impl Into<String>, symbol: impl Into<String>, amount: f64) -> Self {
        Self {
            mint: mint.into(),
            symbol: symbol.into(),
            amount,
            usd_price: None,
            usd_value: None,
            tag: ValuationTag::Na,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_usd: f64,
    pub included_count: u32,
    pub excluded_count: u32,
    pub haircut_subtotal_usd: f64,
    pub holdings: Vec<Holding>,
    pub notes: String,
}

/// Skips dust, sums CG/DEX-tagged holdings into `total_usd`, sums haircut
/// EST_50 holdings into a separate subtotal excluded from the main total,
/// counts NA holdings as excluded, and sorts the surviving holdings by USD
/// value descending.
pub struct Valuator {
    dust_min_usd: f64,
    haircut_pct: f64,
}

impl Valuator {
    pub fn new(dust_min_usd: f64, haircut_pct: f64) -> Self {
        Self { dust_min_usd, haircut_pct }
    }

    fn is_dust(&self, holding: &Holding) -> bool {
        match holding.usd_value {
            Some(v) => v < self.dust_min_usd,
            None => false,
        }
    }

    pub fn value_portfolio(&self, holdings: &[Holding]) -> PortfolioSummary {
        let mut summary = PortfolioSummary::default();

        for holding in holdings {
            if self.is_dust(holding) {
                continue;
            }
            match holding.tag {
                ValuationTag::Cg | ValuationTag::Dex => {
                    if let Some(value) = holding.usd_value {
                        summary.total_usd += value;
                        summary.included_count += 1;
                        summary.holdings.push(holding.clone());
                    }
                }
                ValuationTag::Est50 => {
                    if let Some(value) = holding.usd_value {
                        let haircutted = value * (self.haircut_pct / 100.0);
                        summary.haircut_subtotal_usd += haircutted;
                        let mut h = holding.clone();
                        h.usd_value = Some(haircutted);
                        summary.holdings.push(h);
                    }
                }
                ValuationTag::Na => {
                    summary.excluded_count += 1;
                }
            }
        }

        summary.holdings.sort_by(|a, b| {
            let av = a.usd_value.unwrap_or(f64::MIN);
            let bv = b.usd_value.unwrap_or(f64::MIN);
            bv.partial_cmp(&av).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut notes = String::new();
        if summary.excluded_count > 0 {
            notes.push_str(&format!("Excludes {} unpriced tokens.", summary.excluded_count));
        }
        if summary.haircut_subtotal_usd > 0.0 {
            if !notes.is_empty() {
                notes.push(' ');
            }
            notes.push_str(&format!("Haircut subtotal: ${:.2}", summary.haircut_subtotal_usd));
        }
        summary.notes = notes;

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(tag: ValuationTag, value: f64) -> Holding {
        Holding {
            mint: "mint".into(),
            symbol: "SYM".into(),
            amount: 1.0,
            usd_price: Some(value),
            usd_value: Some(value),
            tag,
        }
    }

    #[test]
    fn sums_cg_and_dex_into_total() {
        let valuator = Valuator::new(1.0, 50.0);
        let holdings = vec![holding(ValuationTag::Cg, 100.0), holding(ValuationTag::Dex, 50.0)];
        let summary = valuator.value_portfolio(&holdings);
        assert_eq!(summary.total_usd, 150.0);
        assert_eq!(summary.included_count, 2);
        assert_eq!(summary.excluded_count, 0);
    }

    #[test]
    fn haircuts_est50_and_excludes_from_total() {
        let valuator = Valuator::new(1.0, 50.0);
        let holdings = vec![holding(ValuationTag::Est50, 200.0)];
        let summary = valuator.value_portfolio(&holdings);
        assert_eq!(summary.total_usd, 0.0);
        assert_eq!(summary.haircut_subtotal_usd, 100.0);
        assert_eq!(summary.holdings[0].usd_value, Some(100.0));
    }

    #[test]
    fn na_holdings_are_excluded_and_counted() {
        let valuator = Valuator::new(1.0, 50.0);
        let mut na = holding(ValuationTag::Na, 10.0);
        na.usd_value = None;
        let summary = valuator.value_portfolio(&[na]);
        assert_eq!(summary.excluded_count, 1);
        assert!(summary.holdings.is_empty());
    }

    #[test]
    fn dust_is_skipped_entirely() {
        let valuator = Valuator::new(5.0, 50.0);
        let holdings = vec![holding(ValuationTag::Dex, 1.0)];
        let summary = valuator.value_portfolio(&holdings);
        assert_eq!(summary.total_usd, 0.0);
        assert_eq!(summary.included_count, 0);
        assert_eq!(summary.excluded_count, 0);
    }

    #[test]
    fn holdings_sorted_descending_by_value() {
        let valuator = Valuator::new(0.0, 50.0);
        let holdings = vec![holding(ValuationTag::Dex, 10.0), holding(ValuationTag::Cg, 500.0)];
        let summary = valuator.value_portfolio(&holdings);
        assert_eq!(summary.holdings[0].usd_value, Some(500.0));
        assert_eq!(summary.holdings[1].usd_value, Some(10.0));
    }

    #[test]
    fn notes_combine_exclusion_and_haircut() {
        let valuator = Valuator::new(0.0, 50.0);
        let mut na = holding(ValuationTag::Na, 10.0);
        na.usd_value = None;
        let holdings = vec![na, holding(ValuationTag::Est50, 100.0)];
        let summary = valuator.value_portfolio(&holdings);
        assert!(summary.notes.contains("Excludes 1"));
        assert!(summary.notes.contains("Haircut subtotal"));
    }
}

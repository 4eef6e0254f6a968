//! Pool normalization (§4 Ingestor supplement), grounded on
//! `original_source/ingestor/src/normalize.cpp`: extracts the common fields
//! every DEX source agrees on and derives spread/impact from constant-
//! product reserves, falling back to a neutral default reserve pair when a
//! source doesn't carry reserves (matching the original's
//! `raw_data.value("reserve_base", 1000000.0)` default).

use soulscout_core::model::DataQuality;

use crate::impact_model;
use crate::sources::PoolData;

const DEFAULT_RESERVE: f64 = 1_000_000.0;

/// A pool's common fields plus derived spread/impact and data-quality tag,
/// independent of route or bar data (those are layered on by the caller).
#[derive(Debug, Clone)]
pub struct NormalizedPool {
    pub address: String,
    pub mint_base: String,
    pub mint_quote: String,
    pub price: f64,
    pub liq_usd: f64,
    pub vol24h_usd: f64,
    pub spread_pct: f64,
    pub impact_1pct_pct: f64,
    pub dq: DataQuality,
    pub dex: String,
}

pub fn normalize_pool(raw: &PoolData, dex_source: &str) -> NormalizedPool {
    let reserve_base = raw.reserve_base.unwrap_or(DEFAULT_RESERVE);
    let reserve_quote = raw.reserve_quote.unwrap_or(DEFAULT_RESERVE);

    let spread_pct = impact_model::estimate_spread_pct(reserve_base, reserve_quote);
    let impact_1pct_pct = impact_model::calculate_1pct_impact(reserve_base, reserve_quote, raw.liq_usd);

    let dq = if raw.liq_usd == 0.0 || raw.price == 0.0 {
        DataQuality::Degraded
    } else {
        DataQuality::Ok
    };

    NormalizedPool {
        address: raw.address.clone(),
        mint_base: raw.mint_base.clone(),
        mint_quote: raw.mint_quote.clone(),
        price: raw.price,
        liq_usd: raw.liq_usd,
        vol24h_usd: raw.vol24h_usd,
        spread_pct,
        impact_1pct_pct,
        dq,
        dex: dex_source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(price: f64, liq: f64) -> PoolData {
        PoolData {
            address: "addr".into(),
            mint_base: "base".into(),
            mint_quote: "quote".into(),
            price,
            liq_usd: liq,
            vol24h_usd: 100_000.0,
            reserve_base: None,
            reserve_quote: None,
        }
    }

    #[test]
    fn degraded_on_zero_liquidity_or_price() {
        assert_eq!(normalize_pool(&pool(1.0, 0.0), "raydium").dq, DataQuality::Degraded);
        assert_eq!(normalize_pool(&pool(0.0, 1000.0), "raydium").dq, DataQuality::Degraded);
    }

    #[test]
    fn ok_quality_with_healthy_fields() {
        assert_eq!(normalize_pool(&pool(1.5, 100_000.0), "orca").dq, DataQuality::Ok);
    }

    #[test]
    fn carries_dex_source_through() {
        let n = normalize_pool(&pool(1.0, 50_000.0), "orca");
        assert_eq!(n.dex, "orca");
    }
}

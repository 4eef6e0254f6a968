//! Price priority cascade (§8 Portfolio), ported 1:1 from
//! `original_source/portfolio/src/price_oracle.cpp`.
//!
//! 1. CoinGecko-equivalent aggregator price, if listed.
//! 2. DEX pool price when liquidity >= $75k (tag `Dex`).
//! 3. DEX pool price when liquidity is [$25k, $75k) (tag `Est50`, haircut
//!    applied later by the valuator, not here).
//! 4. Untagged `Na` if none apply.

use tracing::debug;

use crate::sources::cg::CoinGeckoClient;
use crate::sources::dex::DexClient;
use crate::valuation::{Holding, ValuationTag};

const DEX_FULL_LIQUIDITY_USD: f64 = 75_000.0;
const DEX_HAIRCUT_LIQUIDITY_USD: f64 = 25_000.0;

pub struct PriceOracle {
    cg: CoinGeckoClient,
    dex: DexClient,
}

impl PriceOracle {
    pub fn new(cg: CoinGeckoClient, dex: DexClient) -> Self {
        Self { cg, dex }
    }

    /// Prices a holding in place, applying the priority cascade.
    pub async fn price_holding(&self, holding: &mut Holding) {
        if let Some(price) = self.cg.get_price_usd(&holding.symbol).await {
            holding.usd_price = Some(price);
            holding.usd_value = Some(holding.amount * price);
            holding.tag = ValuationTag::Cg;
            debug!(symbol = %holding.symbol, price, "priced via coingecko");
            return;
        }

        if let Some(pool) = self.dex.get_pool_info(&holding.mint).await {
            if pool.liquidity_usd >= DEX_FULL_LIQUIDITY_USD {
                holding.usd_price = Some(pool.price);
                holding.usd_value = Some(holding.amount * pool.price);
                holding.tag = ValuationTag::Dex;
                debug!(symbol = %holding.symbol, price = pool.price, liq = pool.liquidity_usd, "priced via dex");
                return;
            }
            if pool.liquidity_usd >= DEX_HAIRCUT_LIQUIDITY_USD {
                holding.usd_price = Some(pool.price);
                holding.usd_value = Some(holding.amount * pool.price);
                holding.tag = ValuationTag::Est50;
                debug!(symbol = %holding.symbol, price = pool.price, liq = pool.liquidity_usd, "priced via dex (haircut)");
                return;
            }
        }

        holding.tag = ValuationTag::Na;
        debug!(symbol = %holding.symbol, "could not price holding");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(8))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn unreachable_sources_tag_na() {
        let oracle = PriceOracle::new(
            CoinGeckoClient::new("http://127.0.0.1:1", http()),
            DexClient::new("http://127.0.0.1:1", "http://127.0.0.1:1", http()),
        );
        let mut holding = Holding::unpriced("mint1", "XYZ", 10.0);
        oracle.price_holding(&mut holding).await;
        assert_eq!(holding.tag, ValuationTag::Na);
        assert!(holding.usd_value.is_none());
    }
}

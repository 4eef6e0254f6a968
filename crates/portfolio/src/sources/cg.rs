//! CoinGecko-equivalent aggregator client, grounded on
//! `original_source/portfolio/src/cg_client.cpp`.

use tracing::warn;

#[derive(serde::Deserialize)]
struct PriceResponse {
    usd: f64,
}

pub struct CoinGeckoClient {
    base_url: String,
    http: reqwest::Client,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self { base_url: base_url.into(), http }
    }

    /// Returns `None` if the aggregator doesn't list the symbol or the
    /// request fails; priority-1 pricing falls through to DEX sources.
    pub async fn get_price_usd(&self, symbol: &str) -> Option<f64> {
        let url = format!("{}/simple/price?ids={}&vs_currencies=usd", self.base_url, symbol);
        match self.http.get(&url).send().await {
            Ok(resp) => match resp.json::<PriceResponse>().await {
                Ok(p) => Some(p.usd),
                Err(_) => None,
            },
            Err(e) => {
                warn!(symbol, error = %e, "coingecko price lookup failed");
                None
            }
        }
    }
}

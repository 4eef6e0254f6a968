//! Pool-price lookup by mint: tries Raydium first, falls back to Orca,
//! grounded on `original_source/portfolio/src/dex_client.cpp`'s
//! `get_pool_info` (`try_raydium` then `try_orca`).

use tracing::warn;

use super::PoolInfo;

#[derive(serde::Deserialize)]
struct PoolResponse {
    price: f64,
    liquidity_usd: f64,
}

pub struct DexClient {
    raydium_base: String,
    orca_base: String,
    http: reqwest::Client,
}

impl DexClient {
    pub fn new(raydium_base: impl Into<String>, orca_base: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            raydium_base: raydium_base.into(),
            orca_base: orca_base.into(),
            http,
        }
    }

    pub async fn get_pool_info(&self, mint: &str) -> Option<PoolInfo> {
        if let Some(info) = self.try_source(&self.raydium_base, mint).await {
            return Some(info);
        }
        self.try_source(&self.orca_base, mint).await
    }

    async fn try_source(&self, base_url: &str, mint: &str) -> Option<PoolInfo> {
        let url = format!("{base_url}/pool/{mint}");
        match self.http.get(&url).send().await {
            Ok(resp) => match resp.json::<PoolResponse>().await {
                Ok(p) => Some(PoolInfo { price: p.price, liquidity_usd: p.liquidity_usd }),
                Err(_) => None,
            },
            Err(e) => {
                warn!(mint, %base_url, error = %e, "dex pool lookup failed");
                None
            }
        }
    }
}

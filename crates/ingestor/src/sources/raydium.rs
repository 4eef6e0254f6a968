//! Raydium pool listing client, grounded on
//! `original_source/ingestor/src/raydium_client.cpp`. Response schema is out
//! of scope (spec.md §1); this wraps the HTTP round trip and falls back to
//! an empty list on failure so a single degraded source never aborts a tick.

use tracing::warn;

use super::PoolData;

pub struct RaydiumClient {
    base_url: String,
    http: reqwest::Client,
}

impl RaydiumClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self { base_url: base_url.into(), http }
    }

    pub async fn get_pools(&self) -> Vec<PoolData> {
        let url = format!("{}/pools", self.base_url);
        match self.http.get(&url).send().await {
            Ok(resp) => match resp.json::<Vec<PoolData>>().await {
                Ok(pools) => pools,
                Err(e) => {
                    warn!(error = %e, "failed to parse raydium pools response");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(error = %e, "failed to fetch raydium pools");
                Vec::new()
            }
        }
    }
}

//! Orca pool listing client, grounded on
//! `original_source/ingestor/src/orca_client.cpp` (reuses Raydium's
//! `PoolData` shape, per the original's `#include "raydium_client.hpp"`).

use tracing::warn;

use super::PoolData;

pub struct OrcaClient {
    base_url: String,
    http: reqwest::Client,
}

impl OrcaClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self { base_url: base_url.into(), http }
    }

    pub async fn get_pools(&self) -> Vec<PoolData> {
        let url = format!("{}/pools", self.base_url);
        match self.http.get(&url).send().await {
            Ok(resp) => match resp.json::<Vec<PoolData>>().await {
                Ok(pools) => pools,
                Err(e) => {
                    warn!(error = %e, "failed to parse orca pools response");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(error = %e, "failed to fetch orca pools");
                Vec::new()
            }
        }
    }
}

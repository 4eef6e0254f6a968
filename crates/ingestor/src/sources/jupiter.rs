//! Jupiter aggregator route client, grounded on
//! `original_source/ingestor/src/jupiter_client.cpp`. On failure, returns a
//! `RouteInfo{ok: false, ..}` rather than propagating — a missing route
//! degrades S10 to 0, it doesn't abort the tick.

use tracing::warn;

use super::RouteInfo;

pub struct JupiterClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(serde::Deserialize)]
struct RouteResponse {
    ok: bool,
    hops: u32,
    dev_pct: f64,
}

impl JupiterClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self { base_url: base_url.into(), http }
    }

    pub async fn get_route(&self, from_mint: &str, to_mint: &str) -> RouteInfo {
        let url = format!("{}/route?from={}&to={}", self.base_url, from_mint, to_mint);
        match self.http.get(&url).send().await {
            Ok(resp) => match resp.json::<RouteResponse>().await {
                Ok(r) => RouteInfo { ok: r.ok, hops: r.hops, dev_pct: r.dev_pct },
                Err(e) => {
                    warn!(error = %e, "failed to parse jupiter route response");
                    RouteInfo::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "failed to fetch jupiter route");
                RouteInfo::default()
            }
        }
    }
}

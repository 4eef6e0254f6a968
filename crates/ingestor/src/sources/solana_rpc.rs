//! Solana RPC health probe with round-robin endpoint rotation, grounded on
//! `original_source/ingestor/src/solana_rpc_client.cpp`.

use parking_lot::Mutex;
use tracing::warn;

pub struct SolanaRpcClient {
    rpc_urls: Vec<String>,
    http: reqwest::Client,
    current_index: Mutex<usize>,
}

impl SolanaRpcClient {
    pub fn new(rpc_urls: Vec<String>, http: reqwest::Client) -> Self {
        Self { rpc_urls, http, current_index: Mutex::new(0) }
    }

    fn rotate(&self) {
        let mut idx = self.current_index.lock();
        if !self.rpc_urls.is_empty() {
            *idx = (*idx + 1) % self.rpc_urls.len();
        }
    }

    /// Probes the current RPC endpoint with `getHealth`; rotates to the next
    /// endpoint on failure so a single bad RPC node doesn't stick.
    pub async fn is_healthy(&self) -> bool {
        let Some(url) = self.current_url() else {
            return false;
        };
        let body = serde_json::json!({"jsonrpc": "2.0", "id": 1, "method": "getHealth"});
        match self.http.post(&url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                warn!(status = %resp.status(), url, "solana rpc unhealthy");
                self.rotate();
                false
            }
            Err(e) => {
                warn!(error = %e, url, "solana rpc request failed");
                self.rotate();
                false
            }
        }
    }

    fn current_url(&self) -> Option<String> {
        let idx = *self.current_index.lock();
        self.rpc_urls.get(idx).cloned()
    }
}

//! Solana RPC token-account listing with round-robin endpoint rotation,
//! grounded on `original_source/portfolio/src/rpc_solana.cpp`.

use parking_lot::Mutex;
use tracing::warn;

/// A single SPL token account held by a wallet, raw amount and decimals as
/// reported by the RPC node (the caller divides by `10^decimals`).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TokenAccount {
    pub mint: String,
    pub amount: u64,
    pub decimals: u8,
}

#[derive(serde::Deserialize)]
struct TokenAccountsResponse {
    accounts: Vec<TokenAccount>,
}

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

    fn current_url(&self) -> Option<String> {
        let idx = *self.current_index.lock();
        self.rpc_urls.get(idx).cloned()
    }

    /// Lists SPL token accounts for a wallet address. Rotates to the next
    /// configured RPC endpoint on failure and returns an empty list rather
    /// than propagating — a single unreachable node never aborts a
    /// `/balance` request, it just sees no holdings from that call.
    pub async fn get_token_accounts(&self, wallet_address: &str) -> Vec<TokenAccount> {
        let Some(url) = self.current_url() else {
            return Vec::new();
        };
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getTokenAccountsByOwner",
            "params": [wallet_address],
        });
        match self.http.post(&url).json(&body).send().await {
            Ok(resp) => match resp.json::<TokenAccountsResponse>().await {
                Ok(r) => r.accounts,
                Err(e) => {
                    warn!(wallet_address, error = %e, "failed to parse token accounts response");
                    self.rotate();
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(wallet_address, url, error = %e, "solana rpc request failed");
                self.rotate();
                Vec::new()
            }
        }
    }

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
}

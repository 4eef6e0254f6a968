//! Portfolio service configuration. No `config.hpp` survived distillation
//! for this service (see `original_source/_INDEX.md`); field names are
//! reconstructed from `original_source/portfolio/src/main.cpp`'s
//! `config->field` call sites, following the same `from_env()` /
//! `default_*()` idiom as the other services' configs.

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    pub redis_url: String,
    pub stream_req: String,
    pub stream_rep: String,
    pub stream_audit: String,

    pub rpc_urls: Vec<String>,
    pub coingecko_base: String,
    pub raydium_base: String,
    pub orca_base: String,
    pub jupiter_base: String,
    pub request_timeout_ms: u64,

    pub dust_min_usd: f64,
    pub haircut_pct: f64,
    pub holdings_default_limit: usize,

    pub listen_addr: String,
    pub listen_port: u16,
    pub log_level: String,
}

impl PortfolioConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let redis_url = std::env::var("REDIS_URL")
            .map_err(|_| anyhow::anyhow!("REDIS_URL is required"))?;

        let rpc_urls = env_string("SOL_RPC_URL", "https://api.mainnet-beta.solana.com")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            redis_url,
            stream_req: env_string("STREAM_REQ", "cmd.requests"),
            stream_rep: env_string("STREAM_REP", "cmd.replies"),
            stream_audit: env_string("STREAM_AUDIT", "audit"),
            rpc_urls,
            coingecko_base: env_string("COINGECKO_BASE_URL", "https://api.coingecko.com/api/v3"),
            raydium_base: env_string("RAYDIUM_BASE_URL", "https://api.raydium.io"),
            orca_base: env_string("ORCA_BASE_URL", "https://api.orca.so"),
            jupiter_base: env_string("JUPITER_BASE_URL", "https://quote-api.jup.ag"),
            request_timeout_ms: env_u64("REQUEST_TIMEOUT_MS", 8_000),
            dust_min_usd: env_f64("DUST_MIN_USD", 1.0),
            haircut_pct: env_f64("HAIRCUT_PCT", 50.0),
            holdings_default_limit: env_u64("HOLDINGS_DEFAULT_LIMIT", 10) as usize,
            listen_addr: env_string("LISTEN_ADDR", "0.0.0.0"),
            listen_port: env_string("LISTEN_PORT", "8085").parse().unwrap_or(8085),
            log_level: env_string("LOG_LEVEL", "info"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        assert_eq!(env_f64("UNSET_KEY_ABC", 1.0), 1.0);
        assert_eq!(env_u64("UNSET_KEY_ABC", 10), 10);
    }
}

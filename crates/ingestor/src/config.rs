//! Ingestor configuration, loaded from environment variables. Grounded on
//! the shape implied by `original_source/ingestor/src/main.cpp`'s
//! `Config::from_env()` usage (no `config.hpp` survived distillation, so
//! field names are reconstructed from `config->field` call sites there).

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct IngestorConfig {
    pub redis_url: String,
    pub stream_market: String,

    pub raydium_base: String,
    pub orca_base: String,
    pub jupiter_base: String,
    pub rpc_urls: Vec<String>,

    pub bar_interval_5m_seconds: i64,
    pub bar_interval_15m_seconds: i64,
    pub global_tick_seconds: u64,
    pub request_timeout_ms: u64,

    pub listen_addr: String,
    pub listen_port: u16,
    pub log_level: String,
}

impl IngestorConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let redis_url = std::env::var("REDIS_URL")
            .map_err(|_| anyhow::anyhow!("REDIS_URL is required"))?;

        let rpc_urls = env_string("SOLANA_RPC_URLS", "https://api.mainnet-beta.solana.com")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            redis_url,
            stream_market: env_string("STREAM_MARKET", "market.updates"),
            raydium_base: env_string("RAYDIUM_BASE_URL", "https://api.raydium.io"),
            orca_base: env_string("ORCA_BASE_URL", "https://api.orca.so"),
            jupiter_base: env_string("JUPITER_BASE_URL", "https://quote-api.jup.ag"),
            rpc_urls,
            bar_interval_5m_seconds: env_i64("BAR_INTERVAL_5M_SECONDS", 300),
            bar_interval_15m_seconds: env_i64("BAR_INTERVAL_15M_SECONDS", 900),
            global_tick_seconds: env_u64("GLOBAL_TICK_SECONDS", 30),
            request_timeout_ms: env_u64("REQUEST_TIMEOUT_MS", 8_000),
            listen_addr: env_string("LISTEN_ADDR", "0.0.0.0"),
            listen_port: env_string("LISTEN_PORT", "8081").parse().unwrap_or(8081),
            log_level: env_string("LOG_LEVEL", "info"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        assert_eq!(env_u64("UNSET_KEY_ABC", 30), 30);
        assert_eq!(env_i64("UNSET_KEY_ABC", 300), 300);
    }
}

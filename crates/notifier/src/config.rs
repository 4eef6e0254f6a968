//! Notifier configuration, grounded on `original_source/notifier/src/
//! config.hpp`'s `Config::from_env()` field set (Postgres fields dropped —
//! this service has no durable store of its own).

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub redis_url: String,
    pub stream_alerts_in: String,
    pub stream_alerts_out: String,
    pub stream_req: String,
    pub stream_rep: String,
    pub stream_audit: String,

    pub dedup_ttl_seconds: i64,
    pub silence_default_minutes: i64,

    pub listen_addr: String,
    pub listen_port: u16,
    pub log_level: String,
}

impl NotifierConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let redis_url = std::env::var("REDIS_URL")
            .map_err(|_| anyhow::anyhow!("REDIS_URL is required"))?;
        Ok(Self {
            redis_url,
            stream_alerts_in: env_string("STREAM_ALERTS_IN", "alerts"),
            stream_alerts_out: env_string("STREAM_ALERTS_OUT", "outbound.alerts"),
            stream_req: env_string("STREAM_REQ", "cmd.requests"),
            stream_rep: env_string("STREAM_REP", "cmd.replies"),
            stream_audit: env_string("STREAM_AUDIT", "audit"),
            dedup_ttl_seconds: env_i64("DEDUP_TTL_SECONDS", 21_600),
            silence_default_minutes: env_i64("SILENCE_DEFAULT_MINUTES", 30),
            listen_addr: env_string("LISTEN_ADDR", "0.0.0.0"),
            listen_port: env_string("LISTEN_PORT", "8082").parse().unwrap_or(8082),
            log_level: env_string("LOG_LEVEL", "info"),
        })
    }
}

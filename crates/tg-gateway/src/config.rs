//! Tg-gateway configuration, grounded on `original_source/tg_gateway/src/
//! config.hpp`. Webhook-mode fields are kept for parity even though this
//! service only wires the poll-adjacent internal intake (§7: transport
//! wire format out of scope).

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub tg_bot_token: String,
    pub owner_telegram_id: i64,

    pub redis_url: String,
    pub stream_req: String,
    pub stream_rep: String,
    pub stream_alerts_out: String,
    pub stream_audit: String,

    pub listen_addr: String,
    pub listen_port: u16,

    pub rate_limit_msgs_per_min: i64,
    pub guest_default_minutes: i64,
    pub reply_timeout_seconds: i64,

    pub log_level: String,
}

impl GatewayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let redis_url = std::env::var("REDIS_URL")
            .map_err(|_| anyhow::anyhow!("REDIS_URL is required"))?;
        let owner_telegram_id = env_i64("OWNER_TG_ID", 0);
        if owner_telegram_id == 0 {
            return Err(anyhow::anyhow!("OWNER_TG_ID is required"));
        }
        Ok(Self {
            tg_bot_token: env_string("BOT_TOKEN", ""),
            owner_telegram_id,
            redis_url,
            stream_req: env_string("STREAM_REQ", "cmd.requests"),
            stream_rep: env_string("STREAM_REP", "cmd.replies"),
            stream_alerts_out: env_string("STREAM_ALERTS_OUT", "outbound.alerts"),
            stream_audit: env_string("STREAM_AUDIT", "audit"),
            listen_addr: env_string("LISTEN_ADDR", "0.0.0.0"),
            listen_port: env_string("LISTEN_PORT", "8083").parse().unwrap_or(8083),
            rate_limit_msgs_per_min: env_i64("RATE_LIMIT_MSGS_PER_MIN", 20),
            guest_default_minutes: env_i64("GUEST_DEFAULT_MINUTES", 30),
            reply_timeout_seconds: env_i64("REPLY_TIMEOUT_SECONDS", 10),
            log_level: env_string("LOG_LEVEL", "info"),
        })
    }
}

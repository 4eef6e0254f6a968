//! Analytics service configuration, loaded from environment variables with
//! defaults matching §6's configuration table. Unlike the teacher's
//! file-backed `RuntimeConfig`, this service's tunables are environment-
//! sourced (no local persistence — analytics state itself is explicitly
//! non-durable, per spec §3 Lifecycle), but the same default-value-per-field
//! discipline applies.

use soulscout_core::band::DEFAULT_BASE_THRESHOLD;
use soulscout_core::throttle::ThrottleConfig;

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub redis_url: String,
    pub base_threshold: f64,
    pub risk_on_adj: i32,
    pub risk_off_adj: i32,
    pub global_actionable_max_per_hour: usize,
    pub cooldown_actionable_hours: f64,
    pub cooldown_headsup_hours: f64,
    pub reentry_guard_hours: f64,
    pub dedup_ttl_seconds: i64,
    pub watch_window_min: i64,
    pub pipeline_shards: usize,
    pub health_port: u16,
}

impl AnalyticsConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let redis_url = std::env::var("REDIS_URL")
            .map_err(|_| anyhow::anyhow!("REDIS_URL is required"))?;
        Ok(Self {
            redis_url,
            base_threshold: env_f64("ACTIONABLE_BASE_THRESHOLD", DEFAULT_BASE_THRESHOLD),
            risk_on_adj: env_f64("RISK_ON_ADJ", -10.0) as i32,
            risk_off_adj: env_f64("RISK_OFF_ADJ", 10.0) as i32,
            global_actionable_max_per_hour: env_usize("GLOBAL_ACTIONABLE_MAX_PER_HOUR", 5),
            cooldown_actionable_hours: env_f64("COOLDOWN_ACTIONABLE_HOURS", 6.0),
            cooldown_headsup_hours: env_f64("COOLDOWN_HEADSUP_HOURS", 1.0),
            reentry_guard_hours: env_f64("REENTRY_GUARD_HOURS", 12.0),
            dedup_ttl_seconds: env_f64("DEDUP_TTL_SECONDS", 21_600.0) as i64,
            watch_window_min: env_f64("WATCH_WINDOW_MIN", 120.0) as i64,
            pipeline_shards: env_usize("PIPELINE_SHARDS", 4),
            health_port: env_string("HEALTH_PORT", "8080").parse().unwrap_or(8080),
        })
    }

    pub fn throttle_config(&self) -> ThrottleConfig {
        ThrottleConfig {
            cooldown_actionable_hours: self.cooldown_actionable_hours,
            cooldown_headsup_hours: self.cooldown_headsup_hours,
            global_actionable_max_per_hour: self.global_actionable_max_per_hour,
            dedup_ttl_seconds: self.dedup_ttl_seconds,
            reentry_guard_hours: self.reentry_guard_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        assert_eq!(DEFAULT_BASE_THRESHOLD, 70.0);
        assert_eq!(env_usize("UNSET_KEY_XYZ", 5), 5);
        assert_eq!(env_f64("UNSET_KEY_XYZ", 1.0), 1.0);
    }
}

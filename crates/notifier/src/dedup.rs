//! Notifier-local dedup, grounded on `original_source/notifier/src/
//! dedup.cpp`. A second, independent layer on top of the analytics
//! throttle's own dedup: an at-least-once redelivery of an already-decided
//! alert must not reach the transport twice just because analytics'
//! dedup window already passed once.

use tracing::error;

use crate::redis_kv::RedisKv;

pub struct DedupManager {
    kv: RedisKv,
    ttl_seconds: i64,
}

impl DedupManager {
    pub fn new(kv: RedisKv, ttl_seconds: i64) -> Self {
        Self { kv, ttl_seconds }
    }

    fn make_key(symbol: &str, band: &str, reason_hash: &str) -> String {
        format!("notifier:dedup:{symbol}:{band}:{reason_hash}")
    }

    pub async fn is_duplicate(&self, symbol: &str, band: &str, reason_hash: &str) -> bool {
        let key = Self::make_key(symbol, band, reason_hash);
        match self.kv.get(&key).await {
            Ok(val) => val.is_some(),
            Err(e) => {
                error!(error = %e, "failed to check dedup");
                false
            }
        }
    }

    pub async fn record(&self, symbol: &str, band: &str, reason_hash: &str) {
        let key = Self::make_key(symbol, band, reason_hash);
        if let Err(e) = self.kv.set_ex(&key, "1", self.ttl_seconds).await {
            error!(error = %e, "failed to record dedup");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_shape_matches_original() {
        assert_eq!(
            DedupManager::make_key("SOL", "actionable", "abc123"),
            "notifier:dedup:SOL:actionable:abc123"
        );
    }
}

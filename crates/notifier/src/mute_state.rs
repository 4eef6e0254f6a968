//! Global silence toggle, grounded on `original_source/notifier/src/
//! mute_state.cpp`. The original keys mute state per Telegram user; this
//! system has a single owner chat, so SPEC_FULL's "global silenced-until
//! timestamp" collapses that to one key.

use tracing::{error, info};

use crate::redis_kv::RedisKv;

const MUTE_KEY: &str = "notifier:mute:global";

pub struct MuteState {
    kv: RedisKv,
}

impl MuteState {
    pub fn new(kv: RedisKv) -> Self {
        Self { kv }
    }

    pub async fn set_mute(&self, minutes: i64) {
        if let Err(e) = self.kv.set_ex(MUTE_KEY, "1", minutes * 60).await {
            error!(error = %e, "failed to set mute");
            return;
        }
        info!(minutes, "alerts muted");
    }

    pub async fn clear_mute(&self) {
        if let Err(e) = self.kv.del(MUTE_KEY).await {
            error!(error = %e, "failed to clear mute");
            return;
        }
        info!("alerts unmuted");
    }

    pub async fn is_muted(&self) -> bool {
        match self.kv.get(MUTE_KEY).await {
            Ok(val) => val.is_some(),
            Err(e) => {
                error!(error = %e, "failed to check mute state");
                false
            }
        }
    }

    pub async fn remaining_minutes(&self) -> i64 {
        match self.kv.ttl(MUTE_KEY).await {
            Ok(ttl) if ttl > 0 => ttl / 60,
            Ok(_) => 0,
            Err(e) => {
                error!(error = %e, "failed to read mute ttl");
                0
            }
        }
    }
}

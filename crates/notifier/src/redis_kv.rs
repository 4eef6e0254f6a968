//! Minimal Redis key-value wrapper for dedup/mute state, distinct from
//! `soulscout_core::bus::StreamBus` (stream-only). Grounded on the same
//! `ConnectionManager`-over-`Client` idiom `bus.rs` uses, applied to the
//! plain `SETEX`/`GET`/`DEL`/`TTL` commands the original `dedup.cpp` and
//! `mute_state.cpp` issue against `sw::redis::Redis`.

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use soulscout_core::error::CoreError;

pub struct RedisKv {
    manager: ConnectionManager,
}

impl RedisKv {
    pub async fn connect(url: &str) -> Result<Self, CoreError> {
        let client = Client::open(url).map_err(|e| CoreError::Config(e.to_string()))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CoreError::BusUnavailable(e.to_string()))?;
        Ok(Self { manager })
    }

    pub async fn set_ex(&self, key: &str, value: &str, seconds: i64) -> Result<(), CoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.set_ex(key, value, seconds.max(1) as u64).await?;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let mut conn = self.manager.clone();
        let val: Option<String> = conn.get(key).await?;
        Ok(val)
    }

    pub async fn del(&self, key: &str) -> Result<(), CoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    pub async fn ttl(&self, key: &str) -> Result<i64, CoreError> {
        let mut conn = self.manager.clone();
        let ttl: i64 = conn.ttl(key).await?;
        Ok(ttl)
    }
}

//! Minimal Redis key-value wrapper for guest PIN/session state, the same
//! `ConnectionManager`-over-`Client` idiom as `soulscout_core::bus`,
//! applied to plain key commands (grounded on
//! `original_source/tg_gateway/src/redis_bus.cpp`'s guest-pin helpers).

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
}

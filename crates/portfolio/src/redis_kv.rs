//! Minimal Redis key-value wrapper for the wallet registry, the same
//! `ConnectionManager`-over-`Client` idiom as `soulscout_core::bus` and
//! `tg-gateway::redis_kv`, extended with set commands for membership.

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

    pub async fn sadd(&self, key: &str, member: &str) -> Result<(), CoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.sadd(key, member).await?;
        Ok(())
    }

    pub async fn srem(&self, key: &str, member: &str) -> Result<(), CoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.srem(key, member).await?;
        Ok(())
    }

    pub async fn smembers(&self, key: &str) -> Result<Vec<String>, CoreError> {
        let mut conn = self.manager.clone();
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }
}

//! Stream bus adapter (§4.11): consumer-group semantics over Redis Streams.
//!
//! Grounded on the original analytics service's `RedisBus` (XGROUP CREATE
//! with `$` as the starting position, XREADGROUP with `>`, XACK, XADD under
//! a single `data` field) and on `FeelsDEX-feels`'s `RedisClient` for the
//! `ConnectionManager`-over-`Client` connection idiom — the only example
//! repo that depends on the `redis` crate.

use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;

/// One message popped from a consumer-group read: its bus-assigned id and
/// the deserialized payload carried under the stream's single `data` field.
#[derive(Debug, Clone)]
pub struct BusMessage<T> {
    pub id: String,
    pub payload: T,
}

pub struct StreamBus {
    manager: ConnectionManager,
}

impl StreamBus {
    pub async fn connect(url: &str) -> Result<Self, CoreError> {
        let client = Client::open(url).map_err(|e| CoreError::Config(e.to_string()))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CoreError::BusUnavailable(e.to_string()))?;
        Ok(Self { manager })
    }

    /// Fail-fast startup check (§7 error kind 5: bus unavailable at
    /// startup).
    pub async fn ping(&self) -> Result<(), CoreError> {
        let mut conn = self.manager.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(CoreError::BusUnavailable(format!(
                "unexpected PING response: {pong}"
            )))
        }
    }

    /// Idempotent consumer-group creation. `$` means "only messages after
    /// creation." Already-exists errors are swallowed.
    pub async fn create_consumer_group(&self, stream: &str, group: &str) -> Result<(), CoreError> {
        let mut conn = self.manager.clone();
        let result: redis::RedisResult<()> = conn
            .xgroup_create_mkstream(stream, group, "$")
            .await;
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(stream, group, "consumer group already exists");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Blocking consumer-group read of at most `max_count` messages, or
    /// until `block_ms` elapses.
    pub async fn read<T>(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        max_count: usize,
        block_ms: usize,
    ) -> Result<Vec<BusMessage<T>>, CoreError>
    where
        T: DeserializeOwned,
    {
        let mut conn = self.manager.clone();
        let opts = StreamReadOptions::default()
            .group(group, consumer)
            .count(max_count)
            .block(block_ms);
        let reply: StreamReadReply = conn.xread_options(&[stream], &[">"], &opts).await?;

        let mut out = Vec::new();
        for key in reply.keys {
            for id in key.ids {
                let Some(redis::Value::BulkString(raw)) = id.map.get("data") else {
                    warn!(stream, msg_id = %id.id, "bus message missing data field");
                    continue;
                };
                match serde_json::from_slice::<T>(raw) {
                    Ok(payload) => out.push(BusMessage {
                        id: id.id.clone(),
                        payload,
                    }),
                    Err(e) => {
                        warn!(stream, msg_id = %id.id, error = %e, "malformed bus message");
                    }
                }
            }
        }
        Ok(out)
    }

    pub async fn ack(&self, stream: &str, group: &str, msg_id: &str) -> Result<(), CoreError> {
        let mut conn = self.manager.clone();
        let _: i64 = conn.xack(stream, group, &[msg_id]).await?;
        Ok(())
    }

    /// Appends a payload to `stream`, serialized as JSON under the single
    /// `data` field, per the at-least-once publish contract.
    pub async fn append<T: Serialize>(&self, stream: &str, payload: &T) -> Result<String, CoreError> {
        let mut conn = self.manager.clone();
        let json = serde_json::to_string(payload)?;
        let id: String = conn.xadd(stream, "*", &[("data", json)]).await?;
        Ok(id)
    }
}

/// Retry helper for transient bus errors: retries `f` indefinitely with a
/// fixed back-off, per §7 error kind 1. Returns only on success since the
/// retry never gives up — the caller's loop boundary is the only exit.
pub async fn retry_forever<F, Fut, T>(mut f: F, backoff: Duration, op: &str) -> T
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, CoreError>>,
{
    loop {
        match f().await {
            Ok(v) => return v,
            Err(e) => {
                warn!(op, error = %e, "transient bus error, retrying");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

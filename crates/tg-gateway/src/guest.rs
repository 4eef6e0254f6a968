//! Guest PIN issuance and session tracking, grounded on
//! `original_source/tg_gateway/src/poller.cpp`'s `handle_guest_command` /
//! `handle_start_command` and `util::generate_pin`. A PIN redeems once: the
//! key is deleted on successful verification.

use rand::Rng;
use tracing::error;

use crate::redis_kv::RedisKv;

fn pin_key(pin: &str) -> String {
    format!("tg:guest:pin:{pin}")
}

fn session_key(user_id: i64) -> String {
    format!("tg:guest:session:{user_id}")
}

pub struct GuestStore {
    kv: RedisKv,
}

impl GuestStore {
    pub fn new(kv: RedisKv) -> Self {
        Self { kv }
    }

    pub fn generate_pin() -> String {
        let mut rng = rand::thread_rng();
        (0..6).map(|_| rng.gen_range(0..10).to_string()).collect()
    }

    pub async fn store_pin(&self, pin: &str, user_id: i64, ttl_seconds: i64) {
        if let Err(e) = self.kv.set_ex(&pin_key(pin), &user_id.to_string(), ttl_seconds).await {
            error!(error = %e, "failed to store guest pin");
        }
    }

    /// Verifies and consumes a PIN, returning the issuing user's id on
    /// success. One-time use: the key is deleted immediately after a hit.
    pub async fn verify_and_consume_pin(&self, pin: &str) -> Option<i64> {
        let key = pin_key(pin);
        match self.kv.get(&key).await {
            Ok(Some(user_id)) => {
                let _ = self.kv.del(&key).await;
                user_id.parse().ok()
            }
            Ok(None) => None,
            Err(e) => {
                error!(error = %e, "failed to verify guest pin");
                None
            }
        }
    }

    pub async fn set_session(&self, user_id: i64, ttl_seconds: i64) {
        if let Err(e) = self.kv.set_ex(&session_key(user_id), "1", ttl_seconds).await {
            error!(error = %e, "failed to set guest session");
        }
    }

    pub async fn is_active(&self, user_id: i64) -> bool {
        match self.kv.get(&session_key(user_id)).await {
            Ok(val) => val.is_some(),
            Err(e) => {
                error!(error = %e, "failed to check guest session");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_pin_is_six_digits() {
        let pin = GuestStore::generate_pin();
        assert_eq!(pin.len(), 6);
        assert!(pin.chars().all(|c| c.is_ascii_digit()));
    }
}

//! Tracked-wallet registry, backed by a Redis set so `/add_wallet` and
//! `/remove_wallet` survive a restart. Keeps bare addresses only — wallet
//! metadata caching is named in spec.md §1 Non-goals and isn't implemented
//! here (grounded on `original_source/portfolio/src/postgres_store.cpp`'s
//! `add_wallet`/`remove_wallet`/`get_active_wallets`, minus the Postgres
//! user/snapshot bookkeeping that a single-owner deployment doesn't need).

use tracing::error;

use crate::redis_kv::RedisKv;

const WALLETS_KEY: &str = "portfolio:wallets";

/// A Solana base58 address is 32-44 characters drawn from the base58
/// alphabet (no 0, O, I, l).
pub fn is_valid_solana_address(address: &str) -> bool {
    if address.len() < 32 || address.len() > 44 {
        return false;
    }
    address
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() && !matches!(b, b'0' | b'O' | b'I' | b'l'))
}

pub struct WalletRegistry {
    kv: RedisKv,
}

impl WalletRegistry {
    pub fn new(kv: RedisKv) -> Self {
        Self { kv }
    }

    pub async fn add(&self, address: &str) -> bool {
        match self.kv.sadd(WALLETS_KEY, address).await {
            Ok(()) => true,
            Err(e) => {
                error!(address, error = %e, "failed to add wallet");
                false
            }
        }
    }

    pub async fn remove(&self, address: &str) -> bool {
        match self.kv.srem(WALLETS_KEY, address).await {
            Ok(()) => true,
            Err(e) => {
                error!(address, error = %e, "failed to remove wallet");
                false
            }
        }
    }

    pub async fn list(&self) -> Vec<String> {
        match self.kv.smembers(WALLETS_KEY).await {
            Ok(wallets) => wallets,
            Err(e) => {
                error!(error = %e, "failed to list wallets");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_address_accepted() {
        assert!(is_valid_solana_address("4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R"));
    }

    #[test]
    fn rejects_ambiguous_characters_and_bad_length() {
        assert!(!is_valid_solana_address("too-short"));
        assert!(!is_valid_solana_address(&"a".repeat(50)));
        assert!(!is_valid_solana_address("0OIl00000000000000000000000000"));
    }
}

//! Shared portfolio service state, mirroring `tg-gateway::GatewayState`'s
//! shape: one instance per process wrapping every long-lived subsystem.

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use crate::config::PortfolioConfig;
use crate::price_oracle::PriceOracle;
use crate::sources::rpc::SolanaRpcClient;
use crate::valuation::Valuator;
use crate::wallet_registry::WalletRegistry;

pub struct PortfolioState {
    pub config: PortfolioConfig,
    pub rpc: SolanaRpcClient,
    pub oracle: PriceOracle,
    pub valuator: Valuator,
    pub wallets: WalletRegistry,
    pub redis_ok: AtomicBool,
    pub start_time: Instant,
}

impl PortfolioState {
    pub fn new(
        config: PortfolioConfig,
        rpc: SolanaRpcClient,
        oracle: PriceOracle,
        wallets: WalletRegistry,
    ) -> Self {
        let valuator = Valuator::new(config.dust_min_usd, config.haircut_pct);
        Self {
            config,
            rpc,
            oracle,
            valuator,
            wallets,
            redis_ok: AtomicBool::new(true),
            start_time: Instant::now(),
        }
    }
}

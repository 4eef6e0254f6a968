//! Thin external-price/RPC clients (§8 Portfolio supplement). Each source's
//! actual wire format is out of scope (spec.md §1: external price sources
//! named but not specified); these are minimal `reqwest`-backed clients
//! that degrade to `None`/empty on any failure rather than propagating,
//! grounded on `original_source/portfolio/src/{cg_client,dex_client,
//! jupiter_client,rpc_solana}.{hpp,cpp}`.

pub mod cg;
pub mod dex;
pub mod rpc;

#[derive(Debug, Clone, Copy)]
pub struct PoolInfo {
    pub price: f64,
    pub liquidity_usd: f64,
}

//! Per-source thin clients (§4 Ingestor supplement).
//!
//! Each DEX/RPC source is a `reqwest::Client` wrapper returning
//! already-extracted pool data or route info; their actual wire formats are
//! explicitly out of scope (spec.md §1: "raw wire formats of DEX and RPC
//! responses... not specified"). These are present as named collaborators
//! with a minimal real HTTP surface, grounded on
//! `original_source/ingestor/src/{raydium_client,orca_client,jupiter_client,
//! solana_rpc_client}.cpp`.

pub mod jupiter;
pub mod orca;
pub mod raydium;
pub mod solana_rpc;

use serde::{Deserialize, Serialize};

/// A single pool's raw-but-extracted figures, shared by Raydium and Orca
/// (the original reuses `PoolData` across both clients).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolData {
    pub address: String,
    pub mint_base: String,
    pub mint_quote: String,
    pub price: f64,
    pub liq_usd: f64,
    pub vol24h_usd: f64,
    pub reserve_base: Option<f64>,
    pub reserve_quote: Option<f64>,
}

/// Route info from Jupiter's aggregator: whether a route exists, how many
/// hops, and the price deviation along the path.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteInfo {
    pub ok: bool,
    pub hops: u32,
    pub dev_pct: f64,
}

//! Shared decision pipeline for the SoulScout services.
//!
//! Every piece of market-data interpretation that all five SoulScout
//! binaries (ingestor, analytics, notifier, tg-gateway, portfolio) agree on
//! lives here: the data model, bar synthesis, rolling per-token state, the
//! signal/confidence/regime/entry/band/throttle chain, alert construction,
//! and the Redis Streams bus adapter.

pub mod alert;
pub mod band;
pub mod bar_synth;
pub mod bus;
pub mod command;
pub mod entry_edge;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod regime;
pub mod scoring;
pub mod signals;
pub mod state_store;
pub mod throttle;

pub use error::CoreError;

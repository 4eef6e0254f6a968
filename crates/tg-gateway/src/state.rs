//! Shared gateway state: auth, rate limiting, guest PINs, the bot
//! transport, and the corr_id -> reply-waiter map that realizes §7's
//! "bounded wait with timeout, replies routed back to the originating
//! chat."

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use soulscout_core::command::Reply;
use tokio::sync::oneshot;

use crate::auth::Authenticator;
use crate::bot_transport::BotTransport;
use crate::config::GatewayConfig;
use crate::guest::GuestStore;
use crate::rate_limiter::RateLimiter;

pub struct GatewayState {
    pub config: GatewayConfig,
    pub auth: Authenticator,
    pub rate_limiter: RateLimiter,
    pub guests: GuestStore,
    pub bot: Arc<dyn BotTransport>,
    pub pending: Mutex<HashMap<String, oneshot::Sender<Reply>>>,
    pub redis_ok: AtomicBool,
    pub start_time: Instant,
}

//! Shared notifier state, mirroring the teacher's `AppState` idiom: config
//! plus the long-lived collaborators each worker needs a handle to.

use std::sync::atomic::AtomicBool;
use std::time::Instant;

use crate::config::NotifierConfig;
use crate::dedup::DedupManager;
use crate::mute_state::MuteState;

pub struct NotifierState {
    pub config: NotifierConfig,
    pub dedup: DedupManager,
    pub mute: MuteState,
    pub redis_ok: AtomicBool,
    pub start_time: Instant,
}

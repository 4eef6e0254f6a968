//! Per-user message rate limiting, grounded on the original's
//! `RateLimiter` (declared in `rate_limiter.hpp`, wired in `main.cpp`, no
//! surviving `.cpp` in the distillation — reconstructed from its call sites:
//! `check_and_record(user_id)` and periodic `cleanup_old_entries()`).

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

pub struct RateLimiter {
    max_per_min: usize,
    history: Mutex<HashMap<i64, VecDeque<i64>>>,
}

impl RateLimiter {
    pub fn new(max_per_min: usize) -> Self {
        Self { max_per_min, history: Mutex::new(HashMap::new()) }
    }

    pub fn check_and_record(&self, user_id: i64, now_ms: i64) -> bool {
        let one_minute_ago = now_ms - 60_000;
        let mut history = self.history.lock();
        let entry = history.entry(user_id).or_default();
        while entry.front().is_some_and(|&t| t < one_minute_ago) {
            entry.pop_front();
        }
        if entry.len() >= self.max_per_min {
            return false;
        }
        entry.push_back(now_ms);
        true
    }

    pub fn cleanup_old_entries(&self, now_ms: i64) {
        let one_minute_ago = now_ms - 60_000;
        let mut history = self.history.lock();
        history.retain(|_, entry| {
            while entry.front().is_some_and(|&t| t < one_minute_ago) {
                entry.pop_front();
            }
            !entry.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_blocks() {
        let limiter = RateLimiter::new(3);
        assert!(limiter.check_and_record(1, 0));
        assert!(limiter.check_and_record(1, 100));
        assert!(limiter.check_and_record(1, 200));
        assert!(!limiter.check_and_record(1, 300));
    }

    #[test]
    fn window_rolls_off_after_a_minute() {
        let limiter = RateLimiter::new(1);
        assert!(limiter.check_and_record(1, 0));
        assert!(!limiter.check_and_record(1, 1_000));
        assert!(limiter.check_and_record(1, 61_000));
    }

    #[test]
    fn tracks_users_independently() {
        let limiter = RateLimiter::new(1);
        assert!(limiter.check_and_record(1, 0));
        assert!(limiter.check_and_record(2, 0));
    }
}

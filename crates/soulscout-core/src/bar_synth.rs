//! Bar synthesis: buckets `PriceTick`s into fixed-interval OHLCV bars.
//!
//! Grounded on the bucket-by-floor-division scheme used by the original
//! ingestor's bar synthesizer: a tick at time `t` belongs to the bucket
//! starting at `floor(t / interval) * interval`. A bucket is emitted once
//! wall-clock time has advanced past its end; the still-open bucket's ticks
//! are retained for the next call.

use crate::error::CoreError;
use crate::model::PriceTick;

/// A completed OHLCV bar plus the bucket window it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OhlcvBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume_usd: f64,
    pub bucket_start_ms: i64,
    pub degraded: bool,
}

/// Buckets ticks into bars of `interval_ms`. One instance per (symbol,
/// interval) pair; `ingestor` runs one at 300s and one at 900s per symbol.
pub struct BarSynthesizer {
    interval_ms: i64,
    ticks: Vec<PriceTick>,
    bucket_start_ms: Option<i64>,
}

impl BarSynthesizer {
    pub fn new(interval_seconds: i64) -> Result<Self, CoreError> {
        if interval_seconds <= 0 {
            return Err(CoreError::Config(format!(
                "InvalidInterval: interval_seconds must be > 0, got {interval_seconds}"
            )));
        }
        Ok(Self {
            interval_ms: interval_seconds * 1000,
            ticks: Vec::new(),
            bucket_start_ms: None,
        })
    }

    fn bucket_start(&self, ts_ms: i64) -> i64 {
        (ts_ms / self.interval_ms) * self.interval_ms
    }

    /// Feeds one tick. Lazily anchors the current bucket on the first tick
    /// received.
    pub fn add_tick(&mut self, tick: PriceTick) {
        let bucket = self.bucket_start(tick.ts_ms);
        if self.bucket_start_ms.is_none() {
            self.bucket_start_ms = Some(bucket);
        }
        self.ticks.push(tick);
    }

    /// Returns any bars whose bucket has closed relative to `now_ms`,
    /// advancing past them and retaining the still-open bucket's ticks.
    pub fn drain_completed(&mut self, now_ms: i64) -> Vec<OhlcvBar> {
        let mut out = Vec::new();
        loop {
            let Some(start) = self.bucket_start_ms else {
                break;
            };
            if now_ms < start + self.interval_ms {
                break;
            }
            let (bucket_ticks, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.ticks)
                .into_iter()
                .partition(|t| self.bucket_start(t.ts_ms) == start);
            self.ticks = rest;

            if !bucket_ticks.is_empty() {
                out.push(synthesize_bar(start, &bucket_ticks));
            }

            self.bucket_start_ms = self
                .ticks
                .iter()
                .map(|t| self.bucket_start(t.ts_ms))
                .min();
        }
        out
    }
}

fn synthesize_bar(bucket_start_ms: i64, ticks: &[PriceTick]) -> OhlcvBar {
    let open = ticks.first().map(|t| t.price).unwrap_or(0.0);
    let close = ticks.last().map(|t| t.price).unwrap_or(0.0);
    let high = ticks.iter().fold(f64::MIN, |acc, t| acc.max(t.price));
    let low = ticks.iter().fold(f64::MAX, |acc, t| acc.min(t.price));
    let volume_usd = ticks.iter().map(|t| t.volume_usd).sum();
    OhlcvBar {
        open,
        high,
        low,
        close,
        volume_usd,
        bucket_start_ms,
        degraded: ticks.len() < 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(price: f64, vol: f64, ts_ms: i64) -> PriceTick {
        PriceTick {
            price,
            volume_usd: vol,
            ts_ms,
        }
    }

    #[test]
    fn rejects_non_positive_interval() {
        assert!(BarSynthesizer::new(0).is_err());
        assert!(BarSynthesizer::new(-5).is_err());
        assert!(BarSynthesizer::new(300).is_ok());
    }

    #[test]
    fn emits_bar_once_wall_clock_passes_bucket_end() {
        let mut synth = BarSynthesizer::new(300).unwrap();
        synth.add_tick(tick(1.0, 10.0, 0));
        synth.add_tick(tick(1.2, 20.0, 100_000));
        synth.add_tick(tick(0.9, 5.0, 200_000));

        // Still inside the bucket: nothing completed yet.
        assert!(synth.drain_completed(250_000).is_empty());

        let bars = synth.drain_completed(300_000);
        assert_eq!(bars.len(), 1);
        let bar = bars[0];
        assert_eq!(bar.open, 1.0);
        assert_eq!(bar.close, 0.9);
        assert_eq!(bar.high, 1.2);
        assert_eq!(bar.low, 0.9);
        assert_eq!(bar.volume_usd, 35.0);
        assert!(!bar.degraded);
    }

    #[test]
    fn degraded_when_fewer_than_three_ticks() {
        let mut synth = BarSynthesizer::new(300).unwrap();
        synth.add_tick(tick(1.0, 10.0, 0));
        synth.add_tick(tick(1.1, 10.0, 50_000));
        let bars = synth.drain_completed(300_000);
        assert_eq!(bars.len(), 1);
        assert!(bars[0].degraded);
    }

    #[test]
    fn not_degraded_with_three_or_more_ticks() {
        let mut synth = BarSynthesizer::new(300).unwrap();
        synth.add_tick(tick(1.0, 10.0, 0));
        synth.add_tick(tick(1.1, 10.0, 50_000));
        synth.add_tick(tick(1.2, 10.0, 100_000));
        let bars = synth.drain_completed(300_000);
        assert_eq!(bars.len(), 1);
        assert!(!bars[0].degraded);
    }

    #[test]
    fn retains_open_bucket_ticks_across_calls() {
        let mut synth = BarSynthesizer::new(300).unwrap();
        synth.add_tick(tick(1.0, 10.0, 0));
        synth.add_tick(tick(1.1, 10.0, 100_000));
        assert!(synth.drain_completed(200_000).is_empty());
        synth.add_tick(tick(1.2, 10.0, 250_000));
        let bars = synth.drain_completed(300_000);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume_usd, 30.0);
    }

    #[test]
    fn multiple_elapsed_buckets_each_emit() {
        let mut synth = BarSynthesizer::new(300).unwrap();
        synth.add_tick(tick(1.0, 10.0, 0));
        synth.add_tick(tick(1.1, 10.0, 100_000));
        synth.add_tick(tick(1.2, 10.0, 200_000));
        synth.add_tick(tick(1.3, 10.0, 650_000));
        let bars = synth.drain_completed(900_000);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].bucket_start_ms, 0);
        assert_eq!(bars[1].bucket_start_ms, 600_000);
    }
}

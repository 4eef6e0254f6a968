//! Core data model (MarketUpdate, TokenState, SignalScores, ConfidenceResult,
//! RegimeAssessment, AlertRecord) shared by every stage of the pipeline.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Rolling history bound for a single token's `TokenState` (24h at typical
/// update cadence).
pub const MAX_HISTORY_LEN: usize = 1440;

/// A single price observation feeding the bar synthesizer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceTick {
    pub price: f64,
    pub volume_usd: f64,
    pub ts_ms: i64,
}

/// Data-quality tag carried on every `MarketUpdate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Ok,
    Degraded,
}

impl Default for DataQuality {
    fn default() -> Self {
        DataQuality::Ok
    }
}

/// Routing descriptor: whether a route to quote currency was found, how
/// many hops it took, and the price deviation along the way.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Route {
    pub ok: bool,
    pub hops: u32,
    pub deviation_pct: f64,
}

/// A single OHLCV bar (5-minute or 15-minute granularity).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Bar {
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    pub v_usd: f64,
}

impl Bar {
    pub fn is_missing(&self) -> bool {
        self.v_usd <= 0.0
    }
}

/// One normalized market observation for a pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketUpdate {
    pub pool: String,
    pub mint_base: String,
    pub mint_quote: String,
    pub price: f64,
    pub liq_usd: f64,
    pub vol24h_usd: f64,
    pub spread_pct: f64,
    pub impact_1pct_pct: f64,
    pub age_hours: f64,
    pub route: Route,
    pub bar_5m: Bar,
    pub bar_15m: Bar,
    pub dq: DataQuality,
    pub ts_ms: i64,
}

impl MarketUpdate {
    /// Applies the §3 invariant: price/liquidity/volume are non-negative and
    /// any missing or zero required field forces `dq = degraded`. This does
    /// not reject the update — it only normalizes the quality tag.
    pub fn normalize_quality(mut self) -> Self {
        self.price = self.price.max(0.0);
        self.liq_usd = self.liq_usd.max(0.0);
        self.vol24h_usd = self.vol24h_usd.max(0.0);
        if self.price == 0.0 || self.liq_usd == 0.0 || self.vol24h_usd == 0.0 {
            self.dq = DataQuality::Degraded;
        }
        self
    }
}

/// Per-token rolling state: latest observation plus a bounded 24h history.
#[derive(Debug, Clone)]
pub struct TokenState {
    pub symbol: String,
    pub latest: MarketUpdate,
    pub history: VecDeque<MarketUpdate>,
    pub first_liquidity_ts_ms: Option<i64>,
}

impl TokenState {
    pub fn new(symbol: impl Into<String>, first: MarketUpdate) -> Self {
        let first_liquidity_ts_ms = (first.liq_usd > 0.0).then_some(first.ts_ms);
        let mut history = VecDeque::with_capacity(64);
        history.push_back(first.clone());
        Self {
            symbol: symbol.into(),
            latest: first,
            history,
            first_liquidity_ts_ms,
        }
    }

    /// Appends `md` to history, evicting the oldest entry when the bound is
    /// exceeded, and replaces `latest`. History stays append-only and
    /// monotone in timestamp by construction (the caller feeds updates in
    /// arrival order per symbol, per §5 ordering guarantees).
    pub fn push(&mut self, md: MarketUpdate) {
        if self.first_liquidity_ts_ms.is_none() && md.liq_usd > 0.0 {
            self.first_liquidity_ts_ms = Some(md.ts_ms);
        }
        self.history.push_back(md.clone());
        while self.history.len() > MAX_HISTORY_LEN {
            self.history.pop_front();
        }
        self.latest = md;
    }
}

/// Whether a symbol appears on a widely-mirrored token list (N1 input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListHygiene {
    Low,
    Normal,
}

impl ListHygiene {
    /// N1's numeric value: 1.0 for a recognized list, 0.9 otherwise.
    pub fn value(self) -> f64 {
        match self {
            ListHygiene::Normal => 1.0,
            ListHygiene::Low => 0.9,
        }
    }
}

/// The ten [0,1] signal scores plus the list-hygiene factor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignalScores {
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
    pub s4: f64,
    pub s5: f64,
    pub s6: f64,
    pub s7: f64,
    pub s8: f64,
    pub s9: f64,
    pub s10: f64,
    pub n1: ListHygiene,
}

impl SignalScores {
    pub fn weighted(&self) -> [f64; 10] {
        [
            self.s1, self.s2, self.s3, self.s4, self.s5, self.s6, self.s7, self.s8, self.s9,
            self.s10,
        ]
    }
}

/// Output of the confidence scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub raw_score: f64,
    pub data_quality: f64,
    pub penalties: f64,
    pub final_confidence: f64,
    pub rug_cap_applied: bool,
    pub young_and_risky: bool,
    pub dq_forced_headsup: bool,
    pub reasons: Vec<String>,
}

/// Market-wide risk regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    RiskOn,
    RiskOff,
    Neutral,
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Regime::RiskOn => "risk_on",
            Regime::RiskOff => "risk_off",
            Regime::Neutral => "neutral",
        };
        write!(f, "{s}")
    }
}

/// Three-indicator regime assessment and the threshold/size adjustments it
/// implies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegimeAssessment {
    pub regime: Regime,
    pub sol_positive: bool,
    pub median_positive: bool,
    pub above_vwap_majority: bool,
    pub threshold_adjustment: i32,
    pub size_adjustment_pct: i32,
}

/// Discrete alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    None,
    HeadsUp,
    Actionable,
    HighConviction,
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Band::None => "none",
            Band::HeadsUp => "heads_up",
            Band::Actionable => "actionable",
            Band::HighConviction => "high_conviction",
        };
        write!(f, "{s}")
    }
}

/// A fully assembled, ready-to-publish alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    pub band: Band,
    pub symbol: String,
    pub price: f64,
    pub confidence: i32,
    pub lines: Vec<String>,
    pub plan: String,
    pub sol_path: String,
    pub est_impact_pct: f64,
    pub corr_id: String,
    pub ts_ms: i64,
}

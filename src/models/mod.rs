use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// OHLCV candlestick data for one fixed time interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: DateTime<Utc>,
    /// Quote asset volume, when the exchange provides it
    pub quote_volume: Option<f64>,
    /// Number of trades in the interval, when the exchange provides it
    pub trade_count: Option<u64>,
}

/// Verify that a candle series is ordered by open_time ascending with no
/// duplicate open_time values. Backtests refuse malformed input; the live
/// path relies on the exchange collaborator for ordering.
pub fn validate_series(candles: &[Candle]) -> Result<()> {
    for i in 1..candles.len() {
        if candles[i].open_time <= candles[i - 1].open_time {
            return Err(Error::CandleData(format!(
                "open_time not strictly ascending at index {} ({} <= {})",
                i,
                candles[i].open_time,
                candles[i - 1].open_time
            )));
        }
    }
    Ok(())
}

/// Trading action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

/// One strategy decision plus supporting metadata.
///
/// Produced fresh on every evaluation and never mutated afterwards. The
/// dispatcher compares whole signals structurally, so every field takes part
/// in change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub action: Action,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_size: Option<f64>,
    /// Snapshot of the indicator values the decision was based on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<BTreeMap<String, f64>>,
}

impl Signal {
    pub fn hold(reason: impl Into<String>) -> Self {
        Self {
            action: Action::Hold,
            reason: reason.into(),
            price: None,
            target_price: None,
            stop_loss: None,
            take_profit: None,
            position_size: None,
            indicators: None,
        }
    }

    pub fn is_hold(&self) -> bool {
        self.action == Action::Hold
    }
}

/// Open position held for a symbol on the live path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: Action,
    pub size: f64,
    pub entry_price: f64,
}

/// Per-symbol state owned by the trading engine.
///
/// Mutated only by the single evaluation loop, after each cycle completes.
#[derive(Debug, Clone, Default)]
pub struct SymbolRuntimeState {
    pub last_signal: Option<Signal>,
    pub position: Option<OpenPosition>,
}

//! Vectorised buy/sell signal generation for the backtest simulator.
//!
//! Each generator produces one boolean per candle; the simulator replays
//! them against a single portfolio. Parameters are validated up front so a
//! bad configuration fails before any simulation work happens.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::indicators::{ema_series, rsi_series};
use crate::models::Candle;

/// Per-candle entry and exit flags, aligned with the candle series
#[derive(Debug, Clone)]
pub struct SignalColumns {
    pub signal_buy: Vec<bool>,
    pub signal_sell: Vec<bool>,
}

impl SignalColumns {
    fn hold_all(len: usize) -> Self {
        Self {
            signal_buy: vec![false; len],
            signal_sell: vec![false; len],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl MacdParams {
    pub fn validate(&self) -> Result<()> {
        if self.fast_period == 0 {
            return Err(Error::validation("fast_period", "must be a positive integer"));
        }
        if self.signal_period == 0 {
            return Err(Error::validation("signal_period", "must be a positive integer"));
        }
        if self.fast_period >= self.slow_period {
            return Err(Error::validation(
                "fast_period",
                format!(
                    "must be less than slow_period ({} >= {})",
                    self.fast_period, self.slow_period
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiParams {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl RsiParams {
    pub fn validate(&self) -> Result<()> {
        if self.period == 0 {
            return Err(Error::validation("period", "must be a positive integer"));
        }
        if self.oversold <= 0.0 {
            return Err(Error::validation("oversold", "must be greater than 0"));
        }
        if self.oversold >= self.overbought {
            return Err(Error::validation(
                "oversold",
                format!(
                    "must be less than overbought ({} >= {})",
                    self.oversold, self.overbought
                ),
            ));
        }
        if self.overbought > 100.0 {
            return Err(Error::validation("overbought", "must be at most 100"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridParams {
    pub upper_price: f64,
    pub lower_price: f64,
    pub grid_num: usize,
    pub quantity: f64,
}

impl GridParams {
    pub fn validate(&self) -> Result<()> {
        if self.lower_price <= 0.0 {
            return Err(Error::validation("lower_price", "must be greater than 0"));
        }
        if self.upper_price <= self.lower_price {
            return Err(Error::validation(
                "upper_price",
                format!(
                    "must be greater than lower_price ({} <= {})",
                    self.upper_price, self.lower_price
                ),
            ));
        }
        if self.grid_num == 0 {
            return Err(Error::validation("grid_num", "must be a positive integer"));
        }
        if self.quantity <= 0.0 {
            return Err(Error::validation("quantity", "must be greater than 0"));
        }
        Ok(())
    }

    /// Evenly spaced price levels from lower to upper, inclusive
    pub fn levels(&self) -> Vec<f64> {
        let step = (self.upper_price - self.lower_price) / self.grid_num as f64;
        (0..=self.grid_num)
            .map(|i| self.lower_price + i as f64 * step)
            .collect()
    }
}

/// A backtest-only signal generator with validated parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BacktestStrategy {
    Macd(MacdParams),
    Rsi(RsiParams),
    Grid(GridParams),
}

impl BacktestStrategy {
    /// Build and validate a generator from a config type name and parameters
    pub fn from_params(strategy_type: &str, params: &Map<String, Value>) -> Result<Self> {
        let params = Value::Object(params.clone());
        let strategy = match strategy_type {
            "macd" => BacktestStrategy::Macd(serde_json::from_value(params)?),
            "rsi" => BacktestStrategy::Rsi(serde_json::from_value(params)?),
            "grid" => BacktestStrategy::Grid(serde_json::from_value(params)?),
            other => return Err(Error::UnsupportedStrategy(other.to_string())),
        };
        strategy.validate()?;
        Ok(strategy)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            BacktestStrategy::Macd(p) => p.validate(),
            BacktestStrategy::Rsi(p) => p.validate(),
            BacktestStrategy::Grid(p) => p.validate(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BacktestStrategy::Macd(_) => "macd",
            BacktestStrategy::Rsi(_) => "rsi",
            BacktestStrategy::Grid(_) => "grid",
        }
    }

    /// Compute the per-candle signal columns for the whole series
    pub fn signal_columns(&self, candles: &[Candle]) -> SignalColumns {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        match self {
            BacktestStrategy::Macd(p) => macd_signals(&closes, p),
            BacktestStrategy::Rsi(p) => rsi_signals(&closes, p),
            BacktestStrategy::Grid(p) => grid_signals(&closes, p),
        }
    }
}

/// BUY when the MACD line crosses above its signal line, SELL on the
/// opposite crossing
fn macd_signals(closes: &[f64], params: &MacdParams) -> SignalColumns {
    let mut columns = SignalColumns::hold_all(closes.len());
    if closes.is_empty() {
        return columns;
    }

    let fast = ema_series(closes, params.fast_period);
    let slow = ema_series(closes, params.slow_period);
    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_series(&macd, params.signal_period);

    for i in 1..closes.len() {
        columns.signal_buy[i] = macd[i] > signal[i] && macd[i - 1] <= signal[i - 1];
        columns.signal_sell[i] = macd[i] < signal[i] && macd[i - 1] >= signal[i - 1];
    }

    columns
}

/// BUY when RSI crosses up through the oversold level, SELL when it crosses
/// down through the overbought level. Rows where RSI is still undefined
/// never signal.
fn rsi_signals(closes: &[f64], params: &RsiParams) -> SignalColumns {
    let mut columns = SignalColumns::hold_all(closes.len());
    let rsi = rsi_series(closes, params.period);

    for i in 1..closes.len() {
        let (Some(cur), Some(prev)) = (rsi[i], rsi[i - 1]) else {
            continue;
        };
        columns.signal_buy[i] = cur > params.oversold && prev <= params.oversold;
        columns.signal_sell[i] = cur < params.overbought && prev >= params.overbought;
    }

    columns
}

/// BUY when the close crosses a grid level from below, SELL when it crosses
/// one from above. One pass over the series, checking every level per step.
fn grid_signals(closes: &[f64], params: &GridParams) -> SignalColumns {
    let mut columns = SignalColumns::hold_all(closes.len());
    let levels = params.levels();

    for i in 1..closes.len() {
        let prev = closes[i - 1];
        let curr = closes[i];
        for &level in &levels {
            if prev < level && curr >= level {
                columns.signal_buy[i] = true;
            }
            if prev > level && curr <= level {
                columns.signal_sell[i] = true;
            }
        }
    }

    columns
}

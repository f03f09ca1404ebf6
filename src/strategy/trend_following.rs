use std::collections::BTreeMap;

use crate::indicators::{atr_series, momentum_series, sma_series, IndicatorFrame};
use crate::models::{Action, Candle, Signal};
use crate::strategy::{Strategy, INSUFFICIENT_DATA};
use crate::Result;

/// Moving-average crossover with a momentum filter.
///
/// BUY when the short MA crosses above the long MA and momentum is positive,
/// SELL on the opposite crossover with negative momentum. Stop loss and take
/// profit are placed one ATR multiple away from the close.
#[derive(Debug)]
pub struct TrendFollowingStrategy {
    period: usize,
    multiplier: f64,
}

impl TrendFollowingStrategy {
    pub fn new(period: usize, multiplier: f64) -> Self {
        Self { period, multiplier }
    }

    fn short_period(&self) -> usize {
        self.period / 2
    }

    /// Derived columns used by the crossover decision
    pub fn indicator_frame(&self, candles: &[Candle]) -> Result<IndicatorFrame> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let mut frame = IndicatorFrame::from_candles(candles);
        frame.insert("ma_short", sma_series(&closes, self.short_period()))?;
        frame.insert("ma_long", sma_series(&closes, self.period))?;
        frame.insert("atr", atr_series(candles, self.period))?;
        frame.insert("momentum", momentum_series(&closes, self.period))?;
        Ok(frame)
    }

    fn snapshot(frame: &IndicatorFrame, idx: usize) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for name in ["ma_short", "ma_long", "atr", "momentum"] {
            if let Some(value) = frame.value(name, idx) {
                out.insert(name.to_string(), value);
            }
        }
        out
    }
}

impl Strategy for TrendFollowingStrategy {
    fn name(&self) -> &str {
        "trend_following"
    }

    fn min_candles(&self) -> usize {
        self.period + 1
    }

    fn try_evaluate(&self, candles: &[Candle]) -> Result<Signal> {
        if candles.len() < self.min_candles() {
            return Ok(Signal::hold(INSUFFICIENT_DATA));
        }

        let frame = self.indicator_frame(candles)?;
        let cur = frame.len() - 1;
        let prev = cur - 1;
        let close = candles[cur].close;

        let (Some(short), Some(long), Some(prev_short), Some(prev_long)) = (
            frame.value("ma_short", cur),
            frame.value("ma_long", cur),
            frame.value("ma_short", prev),
            frame.value("ma_long", prev),
        ) else {
            return Ok(Signal::hold(INSUFFICIENT_DATA));
        };
        let (Some(atr), Some(momentum)) =
            (frame.value("atr", cur), frame.value("momentum", cur))
        else {
            return Ok(Signal::hold(INSUFFICIENT_DATA));
        };

        let crossed_up = short > long && prev_short <= prev_long;
        let crossed_down = short < long && prev_short >= prev_long;

        if crossed_up && momentum > 0.0 {
            return Ok(Signal {
                action: Action::Buy,
                reason: "moving average crossover with positive momentum".to_string(),
                price: Some(close),
                target_price: None,
                stop_loss: Some(close - self.multiplier * atr),
                take_profit: Some(close + self.multiplier * atr),
                position_size: None,
                indicators: Some(Self::snapshot(&frame, cur)),
            });
        }

        if crossed_down && momentum < 0.0 {
            return Ok(Signal {
                action: Action::Sell,
                reason: "moving average crossover with negative momentum".to_string(),
                price: Some(close),
                target_price: None,
                stop_loss: Some(close + self.multiplier * atr),
                take_profit: Some(close - self.multiplier * atr),
                position_size: None,
                indicators: Some(Self::snapshot(&frame, cur)),
            });
        }

        Ok(Signal::hold("no clear signal"))
    }
}

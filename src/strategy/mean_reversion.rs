use std::collections::BTreeMap;

use crate::indicators::{rolling_std_series, rsi_series, sma_series, IndicatorFrame};
use crate::models::{Action, Candle, Signal};
use crate::strategy::{Strategy, INSUFFICIENT_DATA};
use crate::Result;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;

/// Bollinger-band reversion with an RSI confirmation.
///
/// BUY when the close drops below the lower band while RSI shows oversold,
/// SELL when it rises above the upper band while RSI shows overbought. The
/// target is the moving average the price is expected to revert to.
#[derive(Debug)]
pub struct MeanReversionStrategy {
    period: usize,
    std_dev_multiplier: f64,
}

impl MeanReversionStrategy {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }

    pub fn indicator_frame(&self, candles: &[Candle]) -> Result<IndicatorFrame> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let ma = sma_series(&closes, self.period);
        let std = rolling_std_series(&closes, self.period);
        let band = |sign: f64| -> Vec<Option<f64>> {
            ma.iter()
                .zip(&std)
                .map(|(m, s)| match (m, s) {
                    (Some(m), Some(s)) => Some(m + sign * self.std_dev_multiplier * s),
                    _ => None,
                })
                .collect()
        };

        let mut frame = IndicatorFrame::from_candles(candles);
        frame.insert("upper_band", band(1.0))?;
        frame.insert("lower_band", band(-1.0))?;
        frame.insert("ma", ma)?;
        frame.insert("std", std)?;
        frame.insert("rsi", rsi_series(&closes, self.period))?;
        Ok(frame)
    }

    fn snapshot(frame: &IndicatorFrame, idx: usize) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for name in ["ma", "std", "upper_band", "lower_band", "rsi"] {
            if let Some(value) = frame.value(name, idx) {
                out.insert(name.to_string(), value);
            }
        }
        out
    }
}

impl Strategy for MeanReversionStrategy {
    fn name(&self) -> &str {
        "mean_reversion"
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
        let close = candles[cur].close;

        let (Some(ma), Some(lower), Some(upper)) = (
            frame.value("ma", cur),
            frame.value("lower_band", cur),
            frame.value("upper_band", cur),
        ) else {
            return Ok(Signal::hold(INSUFFICIENT_DATA));
        };
        // RSI is undefined on a perfectly flat window; no trade either way
        let rsi = frame.value("rsi", cur);

        if close < lower && rsi.is_some_and(|r| r < RSI_OVERSOLD) {
            return Ok(Signal {
                action: Action::Buy,
                reason: "price below lower band with oversold RSI".to_string(),
                price: Some(close),
                target_price: Some(ma),
                stop_loss: None,
                take_profit: None,
                position_size: None,
                indicators: Some(Self::snapshot(&frame, cur)),
            });
        }

        if close > upper && rsi.is_some_and(|r| r > RSI_OVERBOUGHT) {
            return Ok(Signal {
                action: Action::Sell,
                reason: "price above upper band with overbought RSI".to_string(),
                price: Some(close),
                target_price: Some(ma),
                stop_loss: None,
                take_profit: None,
                position_size: None,
                indicators: Some(Self::snapshot(&frame, cur)),
            });
        }

        Ok(Signal::hold("no clear signal"))
    }
}

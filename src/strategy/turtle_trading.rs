use std::collections::BTreeMap;

use crate::indicators::{calculate_atr, highest, lowest};
use crate::models::{Action, Candle, Signal};
use crate::strategy::{Strategy, INSUFFICIENT_DATA};
use crate::Result;

/// Notional account size used for volatility-scaled position sizing
const ACCOUNT_SIZE: f64 = 10_000.0;
/// Fraction of the account risked per unit of ATR
const RISK_PER_TRADE: f64 = 0.01;
/// Stop loss and take profit distance in ATR multiples
const ATR_STOP_MULTIPLIER: f64 = 2.0;

/// Donchian channel breakout in the style of the original turtle rules.
///
/// Entry channels are computed over windows ending at the previous candle,
/// so the current close can actually exceed them. A breakout must clear the
/// channels ending at both of the two prior candles to fire.
#[derive(Debug)]
pub struct TurtleTradingStrategy {
    entry_period: usize,
    exit_period: usize,
    atr_period: usize,
}

impl TurtleTradingStrategy {
    pub fn new(entry_period: usize, exit_period: usize, atr_period: usize) -> Self {
        Self {
            entry_period,
            exit_period,
            atr_period,
        }
    }

    /// Units to buy so that one ATR of adverse movement costs 1% of the
    /// account, rounded to three decimals. Zero when ATR is zero.
    fn position_size(atr: f64) -> f64 {
        if atr == 0.0 {
            return 0.0;
        }
        let raw = ACCOUNT_SIZE * RISK_PER_TRADE / atr;
        (raw * 1000.0).round() / 1000.0
    }

    /// Entry channel over the `entry_period` candles ending `offset` candles
    /// before the last one
    fn entry_channel(&self, candles: &[Candle], offset: usize) -> Option<(f64, f64)> {
        let end = candles.len().checked_sub(offset)?;
        let start = end.checked_sub(self.entry_period)?;

        let highs: Vec<f64> = candles[start..end].iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles[start..end].iter().map(|c| c.low).collect();
        Some((highest(&highs)?, lowest(&lows)?))
    }
}

impl Strategy for TurtleTradingStrategy {
    fn name(&self) -> &str {
        "turtle_trading"
    }

    fn min_candles(&self) -> usize {
        // entry channels need two windows ending before the current candle;
        // ATR needs one more candle than its period for the first delta
        (self.entry_period + 1)
            .max(self.exit_period)
            .max(self.atr_period)
            + 1
    }

    fn try_evaluate(&self, candles: &[Candle]) -> Result<Signal> {
        if candles.len() < self.min_candles() {
            return Ok(Signal::hold(INSUFFICIENT_DATA));
        }

        let close = candles[candles.len() - 1].close;
        let (Some((upper_prev, lower_prev)), Some((upper_prev2, lower_prev2))) =
            (self.entry_channel(candles, 1), self.entry_channel(candles, 2))
        else {
            return Ok(Signal::hold(INSUFFICIENT_DATA));
        };
        let Some(atr) = calculate_atr(candles, self.atr_period) else {
            return Ok(Signal::hold(INSUFFICIENT_DATA));
        };

        if close > upper_prev && close > upper_prev2 {
            let mut indicators = BTreeMap::new();
            indicators.insert("entry_upper".to_string(), upper_prev);
            indicators.insert("atr".to_string(), atr);

            return Ok(Signal {
                action: Action::Buy,
                reason: "breakout above entry channel".to_string(),
                price: Some(close),
                target_price: None,
                stop_loss: Some(close - ATR_STOP_MULTIPLIER * atr),
                take_profit: Some(close + ATR_STOP_MULTIPLIER * atr),
                position_size: Some(Self::position_size(atr)),
                indicators: Some(indicators),
            });
        }

        if close < lower_prev && close < lower_prev2 {
            let mut indicators = BTreeMap::new();
            indicators.insert("entry_lower".to_string(), lower_prev);
            indicators.insert("atr".to_string(), atr);

            return Ok(Signal {
                action: Action::Sell,
                reason: "breakout below entry channel".to_string(),
                price: Some(close),
                target_price: None,
                stop_loss: Some(close + ATR_STOP_MULTIPLIER * atr),
                take_profit: Some(close - ATR_STOP_MULTIPLIER * atr),
                position_size: Some(Self::position_size(atr)),
                indicators: Some(indicators),
            });
        }

        Ok(Signal::hold("no clear signal"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn candle(i: usize, high: f64, low: f64, close: f64) -> Candle {
        let open_time = Utc.timestamp_opt(i as i64 * 3600, 0).unwrap();
        Candle {
            symbol: "TEST".to_string(),
            open_time,
            open: close,
            high,
            low,
            close,
            volume: 1000.0,
            close_time: open_time + chrono::Duration::minutes(59),
            quote_volume: None,
            trade_count: None,
        }
    }

    fn ranging(count: usize) -> Vec<Candle> {
        (0..count).map(|i| candle(i, 105.0, 95.0, 100.0)).collect()
    }

    #[test]
    fn test_insufficient_data_holds() {
        let strategy = TurtleTradingStrategy::new(5, 3, 5);
        let signal = strategy.evaluate(&ranging(6));
        assert_eq!(signal.action, Action::Hold);
        assert_eq!(signal.reason, INSUFFICIENT_DATA);
    }

    #[test]
    fn test_breakout_above_channel_buys() {
        let mut data = ranging(7);
        data.push(candle(7, 111.0, 108.0, 110.0));

        let strategy = TurtleTradingStrategy::new(5, 3, 5);
        let signal = strategy.evaluate(&data);

        assert_eq!(signal.action, Action::Buy);
        assert_eq!(signal.price, Some(110.0));
        let indicators = signal.indicators.as_ref().unwrap();
        assert_eq!(indicators["entry_upper"], 105.0);
        assert!(indicators["atr"] > 0.0);

        let atr = indicators["atr"];
        assert_relative_eq!(signal.stop_loss.unwrap(), 110.0 - 2.0 * atr);
        assert_relative_eq!(
            signal.position_size.unwrap(),
            (10_000.0 * 0.01 / atr * 1000.0).round() / 1000.0
        );
    }

    #[test]
    fn test_breakout_below_channel_sells() {
        let mut data = ranging(7);
        data.push(candle(7, 92.0, 89.0, 90.0));

        let strategy = TurtleTradingStrategy::new(5, 3, 5);
        let signal = strategy.evaluate(&data);

        assert_eq!(signal.action, Action::Sell);
        let indicators = signal.indicators.as_ref().unwrap();
        assert_eq!(indicators["entry_lower"], 95.0);
        assert!(signal.take_profit.unwrap() < 90.0);
    }

    #[test]
    fn test_inside_channel_holds() {
        let strategy = TurtleTradingStrategy::new(5, 3, 5);
        let signal = strategy.evaluate(&ranging(10));
        assert_eq!(signal.action, Action::Hold);
        assert_eq!(signal.reason, "no clear signal");
    }

    #[test]
    fn test_position_size_rounding_and_zero_atr() {
        assert_eq!(TurtleTradingStrategy::position_size(0.0), 0.0);
        // 100 / 3 rounded to three decimals
        assert_relative_eq!(TurtleTradingStrategy::position_size(3.0), 33.333);
        assert_relative_eq!(TurtleTradingStrategy::position_size(10.2), 9.804);
    }
}

//! Single-position portfolio replay.
//!
//! Walks the candle series once, acting on precomputed buy/sell columns.
//! The portfolio is either flat or fully long; a buy while long and a sell
//! while flat are both no-ops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backtest::signals::SignalColumns;
use crate::error::{Error, Result};
use crate::models::{validate_series, Action, Candle};

/// Fraction of the cash balance converted to position on each entry; the
/// 1% holdback absorbs the entry fee and the whole balance is consumed
const ENTRY_FRACTION: f64 = 0.99;

/// One executed trade in a backtest replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestTrade {
    pub timestamp: DateTime<Utc>,
    pub side: Action,
    pub price: f64,
    pub quantity: f64,
    pub fee: f64,
    /// Cash balance after the trade
    pub balance: f64,
    /// Market value of the open position after the trade
    pub position_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_loss_pct: Option<f64>,
}

/// Equity curve sample taken after each candle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Full result of one backtest replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    pub id: Uuid,
    pub initial_balance: f64,
    /// Cash plus any open position valued at the last close
    pub final_balance: f64,
    pub total_return: f64,
    pub total_return_pct: f64,
    /// Largest peak-to-trough equity decline, as a percentage of the peak
    pub max_drawdown_pct: f64,
    pub trades: Vec<BacktestTrade>,
    pub portfolio_values: Vec<PortfolioPoint>,
}

/// Replay the signal columns against the candle series.
///
/// Malformed input (unordered candles, column length mismatch, non-positive
/// balance) is refused outright rather than producing a partial report.
pub fn simulate(
    candles: &[Candle],
    signals: &SignalColumns,
    initial_balance: f64,
    fee_rate: f64,
) -> Result<BacktestReport> {
    if candles.is_empty() {
        return Err(Error::CandleData("empty candle series".to_string()));
    }
    validate_series(candles)?;
    if signals.signal_buy.len() != candles.len() || signals.signal_sell.len() != candles.len() {
        return Err(Error::CandleData(format!(
            "signal columns have {}/{} rows, candle series has {}",
            signals.signal_buy.len(),
            signals.signal_sell.len(),
            candles.len()
        )));
    }
    if !initial_balance.is_finite() || initial_balance <= 0.0 {
        return Err(Error::validation("initial_balance", "must be greater than 0"));
    }
    if !fee_rate.is_finite() || fee_rate < 0.0 {
        return Err(Error::validation("fee_rate", "must be non-negative"));
    }

    let mut balance = initial_balance;
    let mut position = 0.0_f64;
    let mut entry_price = 0.0_f64;
    let mut trades = Vec::new();
    let mut portfolio_values = Vec::with_capacity(candles.len());

    for (i, candle) in candles.iter().enumerate() {
        let close = candle.close;

        if signals.signal_buy[i] && balance > 0.0 {
            let spent = balance * ENTRY_FRACTION;
            let quantity = spent / close;
            let fee = spent * fee_rate;

            balance = 0.0;
            position = quantity;
            entry_price = close;

            trades.push(BacktestTrade {
                timestamp: candle.open_time,
                side: Action::Buy,
                price: close,
                quantity,
                fee,
                balance,
                position_value: position * close,
                profit_loss: None,
                profit_loss_pct: None,
            });
        } else if signals.signal_sell[i] && position > 0.0 {
            let proceeds = position * close;
            let fee = proceeds * fee_rate;
            let profit_loss = (close - entry_price) * position - fee;
            let profit_loss_pct = (close / entry_price - 1.0) * 100.0;

            balance += proceeds - fee;

            trades.push(BacktestTrade {
                timestamp: candle.open_time,
                side: Action::Sell,
                price: close,
                quantity: position,
                fee,
                balance,
                position_value: 0.0,
                profit_loss: Some(profit_loss),
                profit_loss_pct: Some(profit_loss_pct),
            });

            position = 0.0;
            entry_price = 0.0;
        }

        portfolio_values.push(PortfolioPoint {
            timestamp: candle.open_time,
            value: balance + position * close,
        });
    }

    // any open position is valued (not traded) at the last close
    let final_balance = balance + position * candles[candles.len() - 1].close;
    let total_return = final_balance - initial_balance;

    Ok(BacktestReport {
        id: Uuid::new_v4(),
        initial_balance,
        final_balance,
        total_return,
        total_return_pct: total_return / initial_balance * 100.0,
        max_drawdown_pct: max_drawdown_pct(&portfolio_values),
        trades,
        portfolio_values,
    })
}

/// Largest peak-to-trough decline of the equity curve, in percent of the peak
fn max_drawdown_pct(points: &[PortfolioPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_drawdown = 0.0_f64;

    for point in points {
        if point.value > peak {
            peak = point.value;
        }
        if peak > 0.0 {
            let drawdown = (peak - point.value) / peak * 100.0;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }
    }

    max_drawdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn candles(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open_time = Utc.timestamp_opt(i as i64 * 3600, 0).unwrap();
                Candle {
                    symbol: "TEST".to_string(),
                    open_time,
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000.0,
                    close_time: open_time + chrono::Duration::minutes(59),
                    quote_volume: None,
                    trade_count: None,
                }
            })
            .collect()
    }

    fn columns(buys: &[bool], sells: &[bool]) -> SignalColumns {
        SignalColumns {
            signal_buy: buys.to_vec(),
            signal_sell: sells.to_vec(),
        }
    }

    #[test]
    fn test_buy_then_sell_round_trip() {
        // buy at 100, sell at 110, 0.1% fee:
        // spent 9900, qty 99, entry fee 9.9; proceeds 10890, exit fee 10.89
        let data = candles(&[100.0, 105.0, 110.0]);
        let signals = columns(&[true, false, false], &[false, false, true]);

        let report = simulate(&data, &signals, 10_000.0, 0.001).unwrap();

        assert_eq!(report.trades.len(), 2);
        let sell = &report.trades[1];
        assert_eq!(sell.side, Action::Sell);
        assert_relative_eq!(sell.quantity, 99.0);
        assert_relative_eq!(sell.fee, 10.89, max_relative = 1e-12);
        assert_relative_eq!(sell.profit_loss_pct.unwrap(), 10.0, max_relative = 1e-12);

        assert_relative_eq!(report.final_balance, 10_879.11, max_relative = 1e-12);
        assert_relative_eq!(report.total_return_pct, 8.7911, max_relative = 1e-9);
    }

    #[test]
    fn test_buy_is_ignored_while_already_long() {
        let data = candles(&[100.0, 100.0, 110.0]);
        let signals = columns(&[true, true, false], &[false, false, true]);

        let report = simulate(&data, &signals, 10_000.0, 0.0).unwrap();

        // only one buy and one sell executed
        assert_eq!(report.trades.len(), 2);
        assert_eq!(report.trades[0].side, Action::Buy);
        assert_eq!(report.trades[1].side, Action::Sell);
    }

    #[test]
    fn test_sell_while_flat_is_a_no_op() {
        let data = candles(&[100.0, 110.0]);
        let signals = columns(&[false, false], &[true, true]);

        let report = simulate(&data, &signals, 10_000.0, 0.001).unwrap();
        assert!(report.trades.is_empty());
        assert_relative_eq!(report.final_balance, 10_000.0);
        assert_relative_eq!(report.total_return_pct, 0.0);
    }

    #[test]
    fn test_open_position_is_valued_not_traded() {
        let data = candles(&[100.0, 120.0]);
        let signals = columns(&[true, false], &[false, false]);

        let report = simulate(&data, &signals, 10_000.0, 0.0).unwrap();

        assert_eq!(report.trades.len(), 1);
        // 99 units valued at the last close
        assert_relative_eq!(report.final_balance, 99.0 * 120.0);
    }

    #[test]
    fn test_equity_curve_has_one_point_per_candle() {
        let data = candles(&[100.0, 101.0, 102.0, 103.0]);
        let signals = columns(&[false; 4], &[false; 4]);

        let report = simulate(&data, &signals, 10_000.0, 0.001).unwrap();
        assert_eq!(report.portfolio_values.len(), 4);
        for point in &report.portfolio_values {
            assert_relative_eq!(point.value, 10_000.0);
        }
    }

    #[test]
    fn test_max_drawdown_zero_for_nondecreasing_curve() {
        let data = candles(&[100.0, 110.0, 120.0]);
        let signals = columns(&[true, false, false], &[false, false, false]);

        let report = simulate(&data, &signals, 10_000.0, 0.0).unwrap();
        assert_relative_eq!(report.max_drawdown_pct, 0.0);
    }

    #[test]
    fn test_max_drawdown_measures_peak_to_trough() {
        // long from the first candle: equity follows price 100 -> 120 -> 90
        let data = candles(&[100.0, 120.0, 90.0, 100.0]);
        let signals = columns(&[true, false, false, false], &[false; 4]);

        let report = simulate(&data, &signals, 10_000.0, 0.0).unwrap();
        // equity follows 99 units: trough 90 vs peak 120 is a 25% decline
        assert_relative_eq!(report.max_drawdown_pct, 25.0, max_relative = 1e-12);
    }

    #[test]
    fn test_unordered_candles_are_refused() {
        let mut data = candles(&[100.0, 101.0]);
        data[1].open_time = data[0].open_time;
        let signals = columns(&[false, false], &[false, false]);

        let err = simulate(&data, &signals, 10_000.0, 0.001).unwrap_err();
        assert!(matches!(err, Error::CandleData(_)));
    }

    #[test]
    fn test_mismatched_signal_columns_are_refused() {
        let data = candles(&[100.0, 101.0]);
        let signals = columns(&[false], &[false, false]);

        let err = simulate(&data, &signals, 10_000.0, 0.001).unwrap_err();
        assert!(err.to_string().contains("rows"));
    }

    #[test]
    fn test_empty_series_is_refused() {
        let signals = columns(&[], &[]);
        let err = simulate(&[], &signals, 10_000.0, 0.001).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_non_positive_balance_is_refused() {
        let data = candles(&[100.0]);
        let signals = columns(&[false], &[false]);
        assert!(simulate(&data, &signals, 0.0, 0.001).is_err());
    }
}

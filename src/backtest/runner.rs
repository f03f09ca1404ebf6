use tracing::info;

use crate::backtest::signals::{BacktestStrategy, SignalColumns};
use crate::backtest::simulator::{simulate, BacktestReport};
use crate::models::{Action, Candle};
use crate::strategy::Strategy;
use crate::Result;

/// Drives a signal source over a candle series and replays the result
/// through the portfolio simulator.
pub struct BacktestRunner {
    initial_balance: f64,
    fee_rate: f64,
}

impl BacktestRunner {
    pub fn new(initial_balance: f64, fee_rate: f64) -> Self {
        Self {
            initial_balance,
            fee_rate,
        }
    }

    /// Backtest a vectorised signal generator
    pub fn run(&self, strategy: &BacktestStrategy, candles: &[Candle]) -> Result<BacktestReport> {
        strategy.validate()?;
        let columns = strategy.signal_columns(candles);
        let report = simulate(candles, &columns, self.initial_balance, self.fee_rate)?;

        info!(
            strategy = strategy.name(),
            candles = candles.len(),
            trades = report.trades.len(),
            return_pct = report.total_return_pct,
            "backtest complete"
        );
        Ok(report)
    }

    /// Backtest a live strategy by replaying it over growing candle windows,
    /// exactly as the engine would have seen them
    pub fn run_strategy(
        &self,
        strategy: &dyn Strategy,
        candles: &[Candle],
    ) -> Result<BacktestReport> {
        let mut columns = SignalColumns {
            signal_buy: vec![false; candles.len()],
            signal_sell: vec![false; candles.len()],
        };

        for i in 0..candles.len() {
            match strategy.evaluate(&candles[..=i]).action {
                Action::Buy => columns.signal_buy[i] = true,
                Action::Sell => columns.signal_sell[i] = true,
                Action::Hold => {}
            }
        }

        let report = simulate(candles, &columns, self.initial_balance, self.fee_rate)?;
        info!(
            strategy = strategy.name(),
            candles = candles.len(),
            trades = report.trades.len(),
            return_pct = report.total_return_pct,
            "backtest complete"
        );
        Ok(report)
    }
}

// Trading strategy module
pub mod mean_reversion;
pub mod registry;
pub mod trend_following;
pub mod turtle_trading;

pub use mean_reversion::MeanReversionStrategy;
pub use registry::create_strategy;
pub use trend_following::TrendFollowingStrategy;
pub use turtle_trading::TurtleTradingStrategy;

use crate::models::{Candle, Signal};
use crate::Result;

/// Reason used by every strategy when the candle window is too short
pub const INSUFFICIENT_DATA: &str = "insufficient data";

/// Base trait for all trading strategies
pub trait Strategy: Send + Sync + std::fmt::Debug {
    /// Strategy name for logging and notifications
    fn name(&self) -> &str;

    /// Minimum candles required before this strategy can decide anything
    fn min_candles(&self) -> usize;

    /// Evaluate the candle window, propagating internal faults
    fn try_evaluate(&self, candles: &[Candle]) -> Result<Signal>;

    /// Evaluate the candle window, never failing.
    ///
    /// Any fault inside the evaluation path is converted into a HOLD signal
    /// carrying the error text, so one symbol's bad data can never take down
    /// the live loop.
    fn evaluate(&self, candles: &[Candle]) -> Signal {
        match self.try_evaluate(candles) {
            Ok(signal) => signal,
            Err(e) => {
                tracing::error!(strategy = self.name(), error = %e, "evaluation fault, holding");
                Signal::hold(format!("error: {e}"))
            }
        }
    }
}

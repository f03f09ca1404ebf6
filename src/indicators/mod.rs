// Technical indicators module
// Pure series computations: every function is deterministic in its inputs,
// and any value needing N prior rows is None until N rows exist.

pub mod atr;
pub mod donchian;
pub mod frame;
pub mod momentum;
pub mod moving_average;
pub mod rsi;

pub use atr::{atr_series, calculate_atr, true_range_series};
pub use donchian::{donchian_series, highest, lowest};
pub use frame::IndicatorFrame;
pub use momentum::momentum_series;
pub use moving_average::{calculate_sma, ema_series, rolling_std_series, sma_series};
pub use rsi::{calculate_rsi, rsi_series};

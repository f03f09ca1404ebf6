//! Average True Range (ATR)
//!
//! Measures volatility as the trailing mean of true ranges over a period.
//! True Range is the greatest of:
//! - Current High - Current Low
//! - Abs(Current High - Previous Close)
//! - Abs(Current Low - Previous Close)

use crate::models::Candle;

/// True range per candle. The first candle has no previous close, so its
/// true range degrades to high - low.
pub fn true_range_series(candles: &[Candle]) -> Vec<f64> {
    let mut out = Vec::with_capacity(candles.len());

    for (i, candle) in candles.iter().enumerate() {
        let tr = if i == 0 {
            candle.high - candle.low
        } else {
            let prev_close = candles[i - 1].close;
            (candle.high - candle.low)
                .max((candle.high - prev_close).abs())
                .max((candle.low - prev_close).abs())
        };
        out.push(tr);
    }

    out
}

/// ATR as a full series: trailing mean of true range over `period` rows,
/// None until a full window exists.
pub fn atr_series(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; candles.len()];
    if period == 0 || candles.len() < period {
        return out;
    }

    let true_ranges = true_range_series(candles);
    let mut window_sum: f64 = true_ranges[..period].iter().sum();
    out[period - 1] = Some(window_sum / period as f64);

    for i in period..true_ranges.len() {
        window_sum += true_ranges[i] - true_ranges[i - period];
        out[i] = Some(window_sum / period as f64);
    }

    out
}

/// Latest ATR value, or None if insufficient data
pub fn calculate_atr(candles: &[Candle], period: usize) -> Option<f64> {
    atr_series(candles, period).last().copied().flatten()
}

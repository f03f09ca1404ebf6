/// Relative Strength Index (RSI)
///
/// Average gain and average loss are plain trailing means over the last
/// `period` one-candle price deltas; RSI = 100 - 100/(1 + gain/loss).
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// Boundary: when the window has losses but no gains RSI is 0; gains but no
/// losses gives 100; a completely flat window leaves RSI undefined (None), so
/// threshold checks fail and strategies fall through to HOLD.
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || prices.len() < period + 1 {
        return out;
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);
    for i in 1..prices.len() {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    // Delta j belongs to price index j+1; the first full window of `period`
    // deltas ends at price index `period`.
    for i in period..prices.len() {
        let start = i - period;
        let avg_gain: f64 = gains[start..i].iter().sum::<f64>() / period as f64;
        let avg_loss: f64 = losses[start..i].iter().sum::<f64>() / period as f64;

        out[i] = if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                None
            } else {
                Some(100.0)
            }
        } else {
            let rs = avg_gain / avg_loss;
            Some(100.0 - (100.0 / (1.0 + rs)))
        };
    }

    out
}

/// Latest RSI value, or None if insufficient data
pub fn calculate_rsi(prices: &[f64], period: usize) -> Option<f64> {
    rsi_series(prices, period).last().copied().flatten()
}

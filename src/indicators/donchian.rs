//! Donchian channel: rolling max(high) / min(low) over a trailing window,
//! used for breakout detection.

/// Highest value of a slice, None when empty
pub fn highest(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Lowest value of a slice, None when empty
pub fn lowest(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Upper and lower channel series: upper[t] = max(high[t-period+1..=t]),
/// lower[t] = min(low[t-period+1..=t]); None until `period` candles exist.
pub fn donchian_series(
    highs: &[f64],
    lows: &[f64],
    period: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let n = highs.len().min(lows.len());
    let mut upper = vec![None; n];
    let mut lower = vec![None; n];
    if period == 0 || n < period {
        return (upper, lower);
    }

    for i in (period - 1)..n {
        upper[i] = highest(&highs[i + 1 - period..=i]);
        lower[i] = lowest(&lows[i + 1 - period..=i]);
    }

    (upper, lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_donchian_window() {
        let highs = vec![10.0, 12.0, 11.0, 14.0, 13.0];
        let lows = vec![9.0, 10.0, 8.0, 12.0, 11.0];

        let (upper, lower) = donchian_series(&highs, &lows, 3);

        assert_eq!(upper[0], None);
        assert_eq!(upper[1], None);
        assert_eq!(upper[2], Some(12.0));
        assert_eq!(upper[3], Some(14.0));
        assert_eq!(upper[4], Some(14.0));

        assert_eq!(lower[2], Some(8.0));
        assert_eq!(lower[3], Some(8.0));
        assert_eq!(lower[4], Some(8.0));
    }

    #[test]
    fn test_donchian_insufficient_data() {
        let highs = vec![10.0, 12.0];
        let lows = vec![9.0, 10.0];
        let (upper, lower) = donchian_series(&highs, &lows, 5);
        assert!(upper.iter().all(Option::is_none));
        assert!(lower.iter().all(Option::is_none));
    }
}

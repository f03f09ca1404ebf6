/// Calculate Simple Moving Average (SMA) over the trailing `period` values
pub fn calculate_sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let sum: f64 = prices.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// SMA as a full series aligned with the input.
///
/// Entries are None until `period` values exist, matching the rolling-window
/// sentinel policy of every other indicator.
pub fn sma_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return out;
    }

    let mut window_sum: f64 = prices[..period].iter().sum();
    out[period - 1] = Some(window_sum / period as f64);

    for i in period..prices.len() {
        window_sum += prices[i] - prices[i - period];
        out[i] = Some(window_sum / period as f64);
    }

    out
}

/// Rolling sample standard deviation (n - 1 denominator) over a trailing
/// `period` window. Needs period >= 2.
pub fn rolling_std_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period < 2 || prices.len() < period {
        return out;
    }

    for i in (period - 1)..prices.len() {
        let window = &prices[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let sum_sq: f64 = window.iter().map(|x| (x - mean) * (x - mean)).sum();
        out[i] = Some((sum_sq / (period - 1) as f64).sqrt());
    }

    out
}

/// Exponential Moving Average as a full series.
///
/// Seeded with the first value and recursed with alpha = 2/(span+1), so it
/// is defined for every index.
pub fn ema_series(prices: &[f64], span: usize) -> Vec<f64> {
    if prices.is_empty() || span == 0 {
        return Vec::new();
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(prices.len());
    let mut ema = prices[0];
    out.push(ema);

    for &price in &prices[1..] {
        ema = alpha * price + (1.0 - alpha) * ema;
        out.push(ema);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sma() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let sma = calculate_sma(&prices, 5);
        assert_eq!(sma, Some(104.0));
    }

    #[test]
    fn test_sma_insufficient_data() {
        let prices = vec![100.0, 102.0];
        assert!(calculate_sma(&prices, 5).is_none());
    }

    #[test]
    fn test_sma_series_sentinels() {
        let prices = vec![1.0, 2.0, 3.0, 4.0];
        let series = sma_series(&prices, 3);

        assert_eq!(series[0], None);
        assert_eq!(series[1], None);
        assert_eq!(series[2], Some(2.0));
        assert_eq!(series[3], Some(3.0));
    }

    #[test]
    fn test_rolling_std_sample() {
        // Window [2, 4, 6]: mean 4, sample variance (4+0+4)/2 = 4, std 2
        let prices = vec![2.0, 4.0, 6.0];
        let series = rolling_std_series(&prices, 3);

        assert_eq!(series[0], None);
        assert_eq!(series[1], None);
        assert_relative_eq!(series[2].unwrap(), 2.0);
    }

    #[test]
    fn test_rolling_std_flat_window_is_zero() {
        let prices = vec![5.0; 10];
        let series = rolling_std_series(&prices, 4);
        assert_relative_eq!(series[9].unwrap(), 0.0);
    }

    #[test]
    fn test_ema_series_seeds_with_first_value() {
        let prices = vec![100.0, 102.0, 104.0];
        let ema = ema_series(&prices, 3);

        assert_eq!(ema[0], 100.0);
        // alpha = 0.5: 0.5*102 + 0.5*100 = 101
        assert_relative_eq!(ema[1], 101.0);
        assert_relative_eq!(ema[2], 102.5);
    }
}

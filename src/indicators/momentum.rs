/// Momentum: close[t] - close[t-period], None until `period` prior values exist
pub fn momentum_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 {
        return out;
    }

    for i in period..prices.len() {
        out[i] = Some(prices[i] - prices[i - period]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_momentum() {
        let prices = vec![100.0, 102.0, 101.0, 105.0];
        let series = momentum_series(&prices, 2);

        assert_eq!(series[0], None);
        assert_eq!(series[1], None);
        assert_eq!(series[2], Some(1.0));
        assert_eq!(series[3], Some(3.0));
    }

    #[test]
    fn test_momentum_insufficient_data() {
        let prices = vec![100.0, 102.0];
        let series = momentum_series(&prices, 5);
        assert!(series.iter().all(Option::is_none));
    }
}

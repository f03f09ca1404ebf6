use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::Candle;

/// Base column names seeded from candles; derived columns may not shadow them.
const BASE_COLUMNS: &[&str] = &["open", "high", "low", "close", "volume"];

/// A table of indicator values keyed by candle index.
///
/// Base OHLCV columns are seeded from the candle series; strategies attach
/// their derived columns on top. A derived value of None means "insufficient
/// data" for that row (the first `period - 1` rows of any rolling
/// computation).
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    len: usize,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl IndicatorFrame {
    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut columns = BTreeMap::new();
        let defined = |f: fn(&Candle) -> f64| -> Vec<Option<f64>> {
            candles.iter().map(|c| Some(f(c))).collect()
        };

        columns.insert("open".to_string(), defined(|c| c.open));
        columns.insert("high".to_string(), defined(|c| c.high));
        columns.insert("low".to_string(), defined(|c| c.low));
        columns.insert("close".to_string(), defined(|c| c.close));
        columns.insert("volume".to_string(), defined(|c| c.volume));

        Self {
            len: candles.len(),
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Attach a derived column. The column must match the frame length and
    /// must not overwrite a base candle column.
    pub fn insert(&mut self, name: &str, series: Vec<Option<f64>>) -> Result<()> {
        if BASE_COLUMNS.contains(&name) {
            return Err(Error::Frame(format!(
                "column `{name}` is a base candle column and cannot be replaced"
            )));
        }
        if series.len() != self.len {
            return Err(Error::Frame(format!(
                "column `{name}` has {} rows, frame has {}",
                series.len(),
                self.len
            )));
        }

        self.columns.insert(name.to_string(), series);
        Ok(())
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Value of a column at a row index; None for unknown columns,
    /// out-of-range rows, or sentinel rows.
    pub fn value(&self, name: &str, index: usize) -> Option<f64> {
        self.columns.get(name)?.get(index).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
                    volume: 500.0,
                    close_time: open_time + chrono::Duration::minutes(59),
                    quote_volume: None,
                    trade_count: None,
                }
            })
            .collect()
    }

    #[test]
    fn test_row_count_matches_candles() {
        let frame = IndicatorFrame::from_candles(&candles(&[1.0, 2.0, 3.0]));
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.value("close", 2), Some(3.0));
        assert_eq!(frame.value("high", 0), Some(2.0));
    }

    #[test]
    fn test_insert_rejects_length_mismatch() {
        let mut frame = IndicatorFrame::from_candles(&candles(&[1.0, 2.0, 3.0]));
        let err = frame.insert("ma", vec![None, Some(1.5)]).unwrap_err();
        assert!(err.to_string().contains("rows"));
    }

    #[test]
    fn test_insert_rejects_base_column_overwrite() {
        let mut frame = IndicatorFrame::from_candles(&candles(&[1.0, 2.0]));
        let err = frame.insert("close", vec![Some(0.0), Some(0.0)]).unwrap_err();
        assert!(err.to_string().contains("base candle column"));
    }

    #[test]
    fn test_determinism() {
        let input = candles(&[10.0, 11.0, 12.0, 13.0]);
        let mut a = IndicatorFrame::from_candles(&input);
        let mut b = IndicatorFrame::from_candles(&input);

        let closes: Vec<f64> = input.iter().map(|c| c.close).collect();
        a.insert("ma", crate::indicators::sma_series(&closes, 2)).unwrap();
        b.insert("ma", crate::indicators::sma_series(&closes, 2)).unwrap();

        assert_eq!(a, b);
    }
}

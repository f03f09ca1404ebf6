use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Error;
use crate::models::Candle;

/// Market shapes available for seeded candle generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketScenario {
    /// Steady uptrend with mild noise (+2% daily average)
    Uptrend,
    /// Steady downtrend with mild noise (-2% daily average)
    Downtrend,
    /// Mean-reverting walk around the base price
    Sideways,
    /// Large swings (up to 5% per candle)
    Volatile,
}

impl FromStr for MarketScenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uptrend" => Ok(MarketScenario::Uptrend),
            "downtrend" => Ok(MarketScenario::Downtrend),
            "sideways" => Ok(MarketScenario::Sideways),
            "volatile" => Ok(MarketScenario::Volatile),
            other => Err(Error::validation(
                "scenario",
                format!("unknown scenario `{other}` (uptrend, downtrend, sideways, volatile)"),
            )),
        }
    }
}

/// Seeded generator of synthetic candle series for backtests and paper
/// trading. The same seed always yields the same series.
pub struct SyntheticDataGenerator {
    rng: StdRng,
    base_price: f64,
    base_volume: f64,
}

impl SyntheticDataGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 150.0,
            base_volume: 1_000_000.0,
        }
    }

    /// Generate `num_candles` candles at `interval_minutes` spacing, ending
    /// near the current time
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_candles: usize,
        interval_minutes: i64,
    ) -> Vec<Candle> {
        let start_time = Utc::now() - Duration::minutes(num_candles as i64 * interval_minutes);
        let mut candles = Vec::with_capacity(num_candles);
        let mut price = self.base_price;

        // +/-2% per day expressed per candle interval
        let daily_drift = match scenario {
            MarketScenario::Uptrend => 0.02,
            MarketScenario::Downtrend => -0.02,
            MarketScenario::Sideways | MarketScenario::Volatile => 0.0,
        };
        let drift_per_interval = daily_drift / (24.0 * 60.0 / interval_minutes as f64);
        let noise_pct = match scenario {
            MarketScenario::Uptrend | MarketScenario::Downtrend => 0.001,
            MarketScenario::Sideways => 0.01,
            MarketScenario::Volatile => 0.05,
        };

        for i in 0..num_candles {
            let open_time = start_time + Duration::minutes(i as i64 * interval_minutes);

            let drift = price * drift_per_interval;
            let reversion = if scenario == MarketScenario::Sideways {
                (self.base_price - price) * 0.1
            } else {
                0.0
            };
            let noise = price * self.rng.gen_range(-noise_pct..noise_pct);
            price += drift + reversion + noise;

            // volatile walks get a floor so the price stays positive
            if price < self.base_price * 0.5 {
                price = self.base_price * 0.5;
            }

            candles.push(self.create_candle(price, open_time, interval_minutes));
        }

        candles
    }

    /// Realistic OHLCV around a close price
    fn create_candle(
        &mut self,
        price: f64,
        open_time: DateTime<Utc>,
        interval_minutes: i64,
    ) -> Candle {
        let intrabar = 0.002;
        let high = price * (1.0 + self.rng.gen_range(0.0..intrabar));
        let low = price * (1.0 - self.rng.gen_range(0.0..intrabar));
        let open = (price * (1.0 + self.rng.gen_range(-intrabar..intrabar))).clamp(low, high);
        let volume = self.base_volume * self.rng.gen_range(0.7..1.3);

        Candle {
            symbol: "SYNTH".to_string(),
            open_time,
            open,
            high,
            low,
            close: price,
            volume,
            close_time: open_time + Duration::minutes(interval_minutes) - Duration::seconds(1),
            quote_volume: None,
            trade_count: None,
        }
    }
}

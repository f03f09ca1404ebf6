//! Boundary traits the trading engine drives, plus paper implementations.
//!
//! Market data, order execution, and notifications are all behind traits so
//! the engine can run against an exchange, a simulator, or test doubles
//! without changing its loop.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::backtest::{MarketScenario, SyntheticDataGenerator};
use crate::models::{Action, Candle, Signal};

/// Source of recent candle data for a symbol
#[async_trait]
pub trait MarketData: Send + Sync {
    /// The most recent `limit` candles, oldest first
    async fn candles(&self, symbol: &str, limit: usize) -> anyhow::Result<Vec<Candle>>;
}

/// Order placement boundary
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    async fn place_market_order(
        &self,
        symbol: &str,
        side: Action,
        quantity: f64,
    ) -> anyhow::Result<()>;
}

/// Outbound alerting boundary
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn trade_alert(
        &self,
        symbol: &str,
        signal: &Signal,
        position_size: f64,
    ) -> anyhow::Result<()>;

    async fn system_alert(&self, title: &str, body: &str) -> anyhow::Result<()>;
}

/// Market data backed by the seeded synthetic generator, for paper trading
pub struct SyntheticMarketData {
    generator: Mutex<SyntheticDataGenerator>,
    scenario: MarketScenario,
}

impl SyntheticMarketData {
    pub fn new(seed: u64, scenario: MarketScenario) -> Self {
        Self {
            generator: Mutex::new(SyntheticDataGenerator::new(seed)),
            scenario,
        }
    }
}

#[async_trait]
impl MarketData for SyntheticMarketData {
    async fn candles(&self, _symbol: &str, limit: usize) -> anyhow::Result<Vec<Candle>> {
        let mut generator = self
            .generator
            .lock()
            .map_err(|_| anyhow::anyhow!("synthetic generator lock poisoned"))?;
        Ok(generator.generate(self.scenario, limit, 5))
    }
}

/// A paper order accepted by [`PaperOrderExecutor`]
#[derive(Debug, Clone, PartialEq)]
pub struct PaperOrder {
    pub symbol: String,
    pub side: Action,
    pub quantity: f64,
    pub placed_at: DateTime<Utc>,
}

/// Order executor that records orders instead of sending them anywhere
#[derive(Default)]
pub struct PaperOrderExecutor {
    orders: Mutex<Vec<PaperOrder>>,
}

impl PaperOrderExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> Vec<PaperOrder> {
        self.orders.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl OrderExecutor for PaperOrderExecutor {
    async fn place_market_order(
        &self,
        symbol: &str,
        side: Action,
        quantity: f64,
    ) -> anyhow::Result<()> {
        info!(symbol, %side, quantity, "paper order placed");
        self.orders
            .lock()
            .map_err(|_| anyhow::anyhow!("paper order book lock poisoned"))?
            .push(PaperOrder {
                symbol: symbol.to_string(),
                side,
                quantity,
                placed_at: Utc::now(),
            });
        Ok(())
    }
}

/// Notifier that writes alerts to the log
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn trade_alert(
        &self,
        symbol: &str,
        signal: &Signal,
        position_size: f64,
    ) -> anyhow::Result<()> {
        info!(
            symbol,
            action = %signal.action,
            reason = %signal.reason,
            price = ?signal.price,
            position_size,
            "trade alert"
        );
        Ok(())
    }

    async fn system_alert(&self, title: &str, body: &str) -> anyhow::Result<()> {
        info!(title, body, "system alert");
        Ok(())
    }
}

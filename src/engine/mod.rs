// Live evaluation loop: fetch candles, evaluate strategies, dispatch signals
pub mod collaborators;
pub mod dispatcher;

pub use collaborators::{
    LogNotifier, MarketData, Notifier, OrderExecutor, PaperOrder, PaperOrderExecutor,
    SyntheticMarketData,
};
pub use dispatcher::SignalDispatcher;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::error::Error;
use crate::models::{Signal, SymbolRuntimeState};
use crate::strategy::Strategy;

/// Minimum candle window requested per evaluation; strategies needing more
/// history raise it
const CANDLE_LOOKBACK: usize = 100;

/// Whether dispatched signals place real orders or only notify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    /// Notify and place orders
    Auto,
    /// Notify only
    Monitor,
}

impl FromStr for EngineMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(EngineMode::Auto),
            "monitor" => Ok(EngineMode::Monitor),
            other => Err(Error::validation(
                "mode",
                format!("unknown mode `{other}` (auto, monitor)"),
            )),
        }
    }
}

/// One symbol under evaluation: its strategy and its runtime state
pub struct SymbolRunner {
    symbol: String,
    strategy: Box<dyn Strategy>,
    position_size: f64,
    state: SymbolRuntimeState,
}

/// Evaluates every configured symbol on a fixed cadence and hands the
/// resulting signals to the dispatcher.
///
/// Symbols are isolated: a market data failure or evaluation fault on one
/// symbol is logged and alerted, and the pass moves on to the next.
pub struct TradingEngine {
    market: Arc<dyn MarketData>,
    notifier: Arc<dyn Notifier>,
    dispatcher: SignalDispatcher,
    symbols: Vec<SymbolRunner>,
}

impl TradingEngine {
    pub fn new(
        mode: EngineMode,
        market: Arc<dyn MarketData>,
        orders: Arc<dyn OrderExecutor>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            market,
            notifier: notifier.clone(),
            dispatcher: SignalDispatcher::new(mode, orders, notifier),
            symbols: Vec::new(),
        }
    }

    pub fn add_symbol(&mut self, symbol: impl Into<String>, strategy: Box<dyn Strategy>, position_size: f64) {
        self.symbols.push(SymbolRunner {
            symbol: symbol.into(),
            strategy,
            position_size,
            state: SymbolRuntimeState::default(),
        });
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Last signal dispatched for a symbol, if any
    pub fn last_signal(&self, symbol: &str) -> Option<&Signal> {
        self.symbols
            .iter()
            .find(|runner| runner.symbol == symbol)
            .and_then(|runner| runner.state.last_signal.as_ref())
    }

    /// One evaluation pass over all symbols. Returns false when any symbol
    /// failed to fetch market data.
    pub async fn run_once(&mut self) -> bool {
        let mut all_ok = true;

        for idx in 0..self.symbols.len() {
            let symbol = self.symbols[idx].symbol.clone();
            let lookback = CANDLE_LOOKBACK.max(self.symbols[idx].strategy.min_candles());

            let candles = match self.market.candles(&symbol, lookback).await {
                Ok(candles) => candles,
                Err(e) => {
                    all_ok = false;
                    error!(symbol, error = %e, "market data fetch failed");
                    if let Err(alert_err) = self
                        .notifier
                        .system_alert("market data error", &format!("{symbol}: {e}"))
                        .await
                    {
                        error!(symbol, error = %alert_err, "system alert failed");
                    }
                    continue;
                }
            };

            let signal = self.symbols[idx].strategy.evaluate(&candles);
            debug!(
                symbol,
                strategy = self.symbols[idx].strategy.name(),
                action = %signal.action,
                reason = %signal.reason,
                "evaluated"
            );

            let position_size = self.symbols[idx].position_size;
            self.dispatcher
                .dispatch(&symbol, signal, position_size, &mut self.symbols[idx].state)
                .await;
        }

        all_ok
    }

    /// Evaluate all symbols on a fixed interval until Ctrl-C
    pub async fn run_continuously(&mut self, interval: Duration) {
        info!(
            symbols = self.symbols.len(),
            interval_secs = interval.as_secs(),
            "engine started"
        );
        let mut ticker = tokio::time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown requested");
                    break;
                }
            }
        }
    }
}

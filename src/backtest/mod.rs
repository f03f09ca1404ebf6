// Backtesting module
pub mod runner;
pub mod signals;
pub mod simulator;
pub mod synthetic;

pub use runner::BacktestRunner;
pub use signals::{BacktestStrategy, GridParams, MacdParams, RsiParams, SignalColumns};
pub use simulator::{simulate, BacktestReport, BacktestTrade, PortfolioPoint};
pub use synthetic::{MarketScenario, SyntheticDataGenerator};

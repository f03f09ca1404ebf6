// Core modules
pub mod backtest;
pub mod config;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod models;
pub mod strategy;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use models::{Action, Candle, Signal};
pub use strategy::Strategy;

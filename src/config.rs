//! JSON application configuration.
//!
//! Per-symbol strategy parameters override the global table for the same
//! strategy name; a symbol with no parameters anywhere fails at build time
//! rather than defaulting.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::engine::EngineMode;
use crate::error::{Error, Result};
use crate::strategy::{create_strategy, Strategy};

fn default_mode() -> String {
    "monitor".to_string()
}

fn default_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolConfig {
    /// Strategy type name, resolved through the registry
    pub strategy: String,
    /// Overrides the global parameter table for this symbol
    #[serde(default)]
    pub strategy_params: Option<Map<String, Value>>,
    /// Order quantity used when the signal does not carry its own
    pub position_size: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// "auto" places orders, "monitor" only notifies
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    pub symbols: BTreeMap<String, SymbolConfig>,
    /// Global parameter tables keyed by strategy type name
    #[serde(default)]
    pub strategies: BTreeMap<String, Map<String, Value>>,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(Error::validation("interval_secs", "must be greater than 0"));
        }
        for (symbol, cfg) in &self.symbols {
            if cfg.position_size <= 0.0 {
                return Err(Error::validation(
                    "position_size",
                    format!("must be greater than 0 for {symbol}"),
                ));
            }
        }
        Ok(())
    }

    pub fn engine_mode(&self) -> Result<EngineMode> {
        self.mode.parse()
    }

    /// Build the configured strategy for a symbol through the registry
    pub fn build_strategy(&self, symbol: &str) -> Result<Box<dyn Strategy>> {
        let cfg = self
            .symbols
            .get(symbol)
            .ok_or_else(|| Error::validation("symbols", format!("unknown symbol {symbol}")))?;

        let empty = Map::new();
        let params = cfg
            .strategy_params
            .as_ref()
            .or_else(|| self.strategies.get(&cfg.strategy))
            .unwrap_or(&empty);

        create_strategy(&cfg.strategy, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> AppConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let config = config(json!({
            "symbols": {
                "BTCUSDT": {"strategy": "trend_following", "position_size": 0.5}
            },
            "strategies": {
                "trend_following": {"period": 20, "multiplier": 2.0}
            }
        }));

        assert_eq!(config.mode, "monitor");
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.engine_mode().unwrap(), EngineMode::Monitor);
    }

    #[test]
    fn test_global_params_used_when_symbol_has_none() {
        let config = config(json!({
            "symbols": {
                "BTCUSDT": {"strategy": "trend_following", "position_size": 0.5}
            },
            "strategies": {
                "trend_following": {"period": 20, "multiplier": 2.0}
            }
        }));

        let strategy = config.build_strategy("BTCUSDT").unwrap();
        assert_eq!(strategy.name(), "trend_following");
        assert_eq!(strategy.min_candles(), 21);
    }

    #[test]
    fn test_symbol_params_override_global() {
        let config = config(json!({
            "symbols": {
                "BTCUSDT": {
                    "strategy": "trend_following",
                    "strategy_params": {"period": 50, "multiplier": 3.0},
                    "position_size": 0.5
                }
            },
            "strategies": {
                "trend_following": {"period": 20, "multiplier": 2.0}
            }
        }));

        let strategy = config.build_strategy("BTCUSDT").unwrap();
        assert_eq!(strategy.min_candles(), 51);
    }

    #[test]
    fn test_missing_params_fail_at_build() {
        let config = config(json!({
            "symbols": {
                "BTCUSDT": {"strategy": "mean_reversion", "position_size": 0.5}
            }
        }));

        let err = config.build_strategy("BTCUSDT").unwrap_err();
        assert!(err.to_string().contains("period"));
    }

    #[test]
    fn test_invalid_position_size_is_rejected() {
        let config = config(json!({
            "symbols": {
                "BTCUSDT": {"strategy": "trend_following", "position_size": 0.0}
            }
        }));
        assert!(config.validate().is_err());
    }
}

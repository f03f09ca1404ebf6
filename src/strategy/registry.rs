//! Maps strategy type names from configuration onto concrete strategies.
//!
//! The set of known strategies is closed: an unknown type name is an error,
//! and every listed parameter is required. There are no silent defaults, so
//! a typo in a config file fails loudly instead of trading with surprise
//! parameter values.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::strategy::{
    MeanReversionStrategy, Strategy, TrendFollowingStrategy, TurtleTradingStrategy,
};

fn require_int(params: &Map<String, Value>, field: &'static str, min: u64) -> Result<usize> {
    let value = params
        .get(field)
        .ok_or_else(|| Error::validation(field, "missing required parameter"))?;
    let n = value
        .as_u64()
        .ok_or_else(|| Error::validation(field, format!("expected a positive integer, got {value}")))?;
    if n < min {
        return Err(Error::validation(field, format!("must be at least {min}, got {n}")));
    }
    Ok(n as usize)
}

fn require_positive_float(params: &Map<String, Value>, field: &'static str) -> Result<f64> {
    let value = params
        .get(field)
        .ok_or_else(|| Error::validation(field, "missing required parameter"))?;
    let x = value
        .as_f64()
        .ok_or_else(|| Error::validation(field, format!("expected a number, got {value}")))?;
    if !x.is_finite() || x <= 0.0 {
        return Err(Error::validation(field, format!("must be positive, got {x}")));
    }
    Ok(x)
}

/// Build a strategy from its config type name and parameter map
pub fn create_strategy(
    strategy_type: &str,
    params: &Map<String, Value>,
) -> Result<Box<dyn Strategy>> {
    match strategy_type {
        "trend_following" => {
            let period = require_int(params, "period", 2)?;
            let multiplier = require_positive_float(params, "multiplier")?;
            Ok(Box::new(TrendFollowingStrategy::new(period, multiplier)))
        }
        "mean_reversion" => {
            let period = require_int(params, "period", 2)?;
            let multiplier = require_positive_float(params, "std_dev_multiplier")?;
            Ok(Box::new(MeanReversionStrategy::new(period, multiplier)))
        }
        "turtle_trading" => {
            let entry_period = require_int(params, "entry_period", 1)?;
            let exit_period = require_int(params, "exit_period", 1)?;
            let atr_period = require_int(params, "atr_period", 1)?;
            Ok(Box::new(TurtleTradingStrategy::new(
                entry_period,
                exit_period,
                atr_period,
            )))
        }
        other => Err(Error::UnsupportedStrategy(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_creates_each_known_strategy() {
        let trend = create_strategy(
            "trend_following",
            &params(json!({"period": 20, "multiplier": 2.0})),
        )
        .unwrap();
        assert_eq!(trend.name(), "trend_following");
        assert_eq!(trend.min_candles(), 21);

        let reversion = create_strategy(
            "mean_reversion",
            &params(json!({"period": 20, "std_dev_multiplier": 2.0})),
        )
        .unwrap();
        assert_eq!(reversion.name(), "mean_reversion");

        let turtle = create_strategy(
            "turtle_trading",
            &params(json!({"entry_period": 20, "exit_period": 10, "atr_period": 14})),
        )
        .unwrap();
        assert_eq!(turtle.name(), "turtle_trading");
        assert_eq!(turtle.min_candles(), 22);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = create_strategy("momentum_magic", &Map::new()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedStrategy(_)));
        assert!(err.to_string().contains("momentum_magic"));
    }

    #[test]
    fn test_missing_parameter_names_the_field() {
        let err = create_strategy("trend_following", &params(json!({"period": 20}))).unwrap_err();
        assert!(err.to_string().contains("multiplier"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_out_of_range_parameters_are_rejected() {
        let err = create_strategy(
            "trend_following",
            &params(json!({"period": 1, "multiplier": 2.0})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("period"));

        let err = create_strategy(
            "mean_reversion",
            &params(json!({"period": 20, "std_dev_multiplier": -1.0})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("std_dev_multiplier"));

        let err = create_strategy(
            "turtle_trading",
            &params(json!({"entry_period": 20, "exit_period": 0, "atr_period": 14})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("exit_period"));
    }
}

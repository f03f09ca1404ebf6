use std::sync::Arc;

use tracing::{error, info};

use crate::engine::collaborators::{Notifier, OrderExecutor};
use crate::engine::EngineMode;
use crate::models::{Action, OpenPosition, Signal, SymbolRuntimeState};

/// Routes strategy signals to the notifier and, in auto mode, the order
/// executor.
///
/// A signal only triggers outward action when it differs from the previous
/// one for the symbol under full structural equality, so a strategy
/// re-emitting the same BUY every cycle places one order, not one per cycle.
/// HOLD signals never act but still participate in change detection.
pub struct SignalDispatcher {
    mode: EngineMode,
    orders: Arc<dyn OrderExecutor>,
    notifier: Arc<dyn Notifier>,
}

impl SignalDispatcher {
    pub fn new(mode: EngineMode, orders: Arc<dyn OrderExecutor>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            mode,
            orders,
            notifier,
        }
    }

    /// Whether this signal differs from the last one seen for the symbol
    pub fn should_act(state: &SymbolRuntimeState, signal: &Signal) -> bool {
        state.last_signal.as_ref() != Some(signal)
    }

    /// Process one evaluated signal for a symbol.
    ///
    /// The last-signal slot is updated even when the order fails: retrying a
    /// failed order every cycle is worse than missing one entry, and the
    /// alert already told the operator.
    pub async fn dispatch(
        &self,
        symbol: &str,
        signal: Signal,
        default_position_size: f64,
        state: &mut SymbolRuntimeState,
    ) {
        if Self::should_act(state, &signal) && !signal.is_hold() {
            let quantity = signal.position_size.unwrap_or(default_position_size);

            if let Err(e) = self.notifier.trade_alert(symbol, &signal, quantity).await {
                error!(symbol, error = %e, "trade alert failed");
            }

            if self.mode == EngineMode::Auto {
                match self
                    .orders
                    .place_market_order(symbol, signal.action, quantity)
                    .await
                {
                    Ok(()) => {
                        info!(symbol, action = %signal.action, quantity, "order placed");
                        state.position = match signal.action {
                            Action::Buy => Some(OpenPosition {
                                side: Action::Buy,
                                size: quantity,
                                entry_price: signal.price.unwrap_or_default(),
                            }),
                            Action::Sell => None,
                            Action::Hold => state.position.clone(),
                        };
                    }
                    Err(e) => {
                        error!(symbol, error = %e, "order placement failed");
                        if let Err(alert_err) = self
                            .notifier
                            .system_alert("order failed", &format!("{symbol}: {e}"))
                            .await
                        {
                            error!(symbol, error = %alert_err, "system alert failed");
                        }
                    }
                }
            }
        }

        state.last_signal = Some(signal);
    }
}

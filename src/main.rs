use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quantbot::backtest::{BacktestRunner, BacktestStrategy, MarketScenario, SyntheticDataGenerator};
use quantbot::engine::{
    EngineMode, LogNotifier, PaperOrderExecutor, SyntheticMarketData, TradingEngine,
};
use quantbot::AppConfig;

#[derive(Parser)]
#[command(name = "quantbot", about = "Strategy evaluation and backtesting bot")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the live evaluation loop against synthetic market data
    Run {
        /// Path to the JSON configuration file
        #[arg(long, default_value = "config.json")]
        config: String,
        /// Override the configured mode (auto, monitor)
        #[arg(long)]
        mode: Option<EngineMode>,
    },
    /// Backtest a signal strategy on a synthetic market scenario
    Backtest {
        /// Strategy type (macd, rsi, grid) with its default parameters
        #[arg(long, default_value = "macd")]
        strategy: String,
        /// Market scenario (uptrend, downtrend, sideways, volatile)
        #[arg(long, default_value = "sideways")]
        scenario: MarketScenario,
        #[arg(long, default_value_t = 500)]
        candles: usize,
        #[arg(long, default_value_t = 10_000.0)]
        initial_balance: f64,
        #[arg(long, default_value_t = 0.001)]
        fee_rate: f64,
        /// Seed for the synthetic data generator
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    match Cli::parse().command {
        Command::Run { config, mode } => run(&config, mode).await,
        Command::Backtest {
            strategy,
            scenario,
            candles,
            initial_balance,
            fee_rate,
            seed,
        } => backtest(&strategy, scenario, candles, initial_balance, fee_rate, seed),
    }
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quantbot=info")),
        )
        .init();
}

async fn run(config_path: &str, mode_override: Option<EngineMode>) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path)?;
    let mode = match mode_override {
        Some(mode) => mode,
        None => config.engine_mode()?,
    };

    let market = Arc::new(SyntheticMarketData::new(42, MarketScenario::Sideways));
    let orders = Arc::new(PaperOrderExecutor::new());
    let notifier = Arc::new(LogNotifier);

    let mut engine = TradingEngine::new(mode, market, orders, notifier);
    for (symbol, symbol_config) in &config.symbols {
        let strategy = config.build_strategy(symbol)?;
        engine.add_symbol(symbol.clone(), strategy, symbol_config.position_size);
    }

    engine
        .run_continuously(Duration::from_secs(config.interval_secs))
        .await;
    Ok(())
}

fn backtest(
    strategy_type: &str,
    scenario: MarketScenario,
    num_candles: usize,
    initial_balance: f64,
    fee_rate: f64,
    seed: u64,
) -> anyhow::Result<()> {
    let strategy = default_backtest_strategy(strategy_type)?;
    let candles = SyntheticDataGenerator::new(seed).generate(scenario, num_candles, 5);

    let runner = BacktestRunner::new(initial_balance, fee_rate);
    let report = runner.run(&strategy, &candles)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn default_backtest_strategy(strategy_type: &str) -> anyhow::Result<BacktestStrategy> {
    use quantbot::backtest::{GridParams, MacdParams, RsiParams};

    let strategy = match strategy_type {
        "macd" => BacktestStrategy::Macd(MacdParams {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }),
        "rsi" => BacktestStrategy::Rsi(RsiParams {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }),
        "grid" => BacktestStrategy::Grid(GridParams {
            upper_price: 165.0,
            lower_price: 135.0,
            grid_num: 10,
            quantity: 1.0,
        }),
        other => anyhow::bail!("unknown backtest strategy `{other}` (macd, rsi, grid)"),
    };
    Ok(strategy)
}

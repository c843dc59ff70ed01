use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tradecycle_core::{AppConfig, ConfigLoader, MarketData, Predictor};
use tradecycle_data::{load_candles, MemoryMarketStore};
use tradecycle_execution::{ExecutionDispatcher, UnconfiguredGateway};
use tradecycle_orchestrator::{CycleOrchestrator, TradingScheduler};
use tradecycle_strategy::{HeuristicPredictor, RiskGate};
use tradecycle_web_api::ApiServer;

#[derive(Parser)]
#[command(name = "tradecycle")]
#[command(about = "Periodic decision-and-risk trading loop", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduled trading loop with the monitoring API
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        /// Directory of per-pair candle CSVs (e.g. BTC_USDT.csv) to seed
        /// the in-memory market store for paper runs
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Run a single trading cycle and print the summary
    RunOnce {
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Start only the monitoring API server
    Server {
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Run { config, data } => {
            run_trading_loop(&config, data.as_deref()).await?;
        }
        Commands::RunOnce { config, data } => {
            run_single_cycle(&config, data.as_deref()).await?;
        }
        Commands::Server { config } => {
            run_server(&config).await?;
        }
    }

    Ok(())
}

async fn run_trading_loop(config_path: &str, data_dir: Option<&str>) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let orchestrator = Arc::new(build_orchestrator(config, data_dir)?);

    let scheduler = TradingScheduler::new(orchestrator.clone());
    tokio::spawn(async move {
        if let Err(e) = scheduler.start().await {
            tracing::error!("trading scheduler failed: {e:#}");
        }
    });

    ApiServer::new(orchestrator).serve(&addr).await
}

async fn run_single_cycle(config_path: &str, data_dir: Option<&str>) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;
    let orchestrator = build_orchestrator(config, data_dir)?;

    let summary = orchestrator.run_cycle_once().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let orchestrator = Arc::new(build_orchestrator(config, None)?);

    ApiServer::new(orchestrator).serve(&addr).await
}

fn build_orchestrator(config: AppConfig, data_dir: Option<&str>) -> Result<CycleOrchestrator> {
    let store = MemoryMarketStore::new();
    if let Some(dir) = data_dir {
        seed_store(&store, dir, &config.trading.pairs)?;
    }
    let market_data: Arc<dyn MarketData> = Arc::new(store);

    let predictor: Arc<dyn Predictor> = Arc::new(HeuristicPredictor::new());
    let risk = Arc::new(RiskGate::new(config.risk.clone()));

    if !config.trading.paper_trading {
        tracing::warn!(
            "live trading enabled but no exchange gateway is wired in; orders will fail"
        );
    }
    let dispatcher = Arc::new(ExecutionDispatcher::new(
        config.trading.paper_trading,
        Arc::new(UnconfiguredGateway),
    ));

    Ok(CycleOrchestrator::new(
        config,
        market_data,
        predictor,
        risk,
        dispatcher,
    ))
}

fn seed_store(store: &MemoryMarketStore, dir: &str, pairs: &[String]) -> Result<()> {
    for symbol in pairs {
        let path = Path::new(dir).join(format!("{symbol}.csv"));
        let Some(path) = path.to_str() else {
            anyhow::bail!("non-UTF-8 data path for {symbol}");
        };
        if !Path::new(path).exists() {
            tracing::warn!(symbol, path, "no candle file for pair, skipping seed");
            continue;
        }
        let candles =
            load_candles(path, symbol).with_context(|| format!("Failed to load {path}"))?;
        tracing::info!(symbol, count = candles.len(), "seeded market store");
        store.ingest_series(symbol, candles);
    }
    Ok(())
}

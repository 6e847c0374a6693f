// =============================================================================
// Crypto Battle Report — Main Entry Point
// =============================================================================
//
// Two front-ends over the same battle runner:
//   serve: HTTP server with the HTML battle page and JSON endpoints.
//   scan:  one batch printed to the terminal, then exit.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod battle;
mod binance;
mod console;
mod errors;
mod indicators;
mod market_data;
mod report;
mod runtime_config;
mod selection;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::battle::{run_battle, BattleRequest};
use crate::binance::{BinanceClient, RateLimitTracker};
use crate::runtime_config::RuntimeConfig;
use crate::types::SelectionPolicy;

const DEFAULT_CONFIG_PATH: &str = "battle_config.json";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

// ---------------------------------------------------------------------------
// CLI argument structs
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "battle-report",
    version,
    about = "Crypto battle reports: EMA / MACD / RSI trend, price HP and ATK per symbol",
    propagate_version = true
)]
struct Cli {
    /// Path to the JSON runtime config (falls back to $BATTLE_CONFIG, then
    /// battle_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the battle page and JSON API
    Serve {
        /// Listen address (falls back to $BATTLE_BIND_ADDR, then 0.0.0.0:5000)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run one batch and print the reports
    Scan {
        /// Candle interval: 1m, 5m, 15m, 30m, 1h, 4h or 1d
        #[arg(long)]
        timeframe: Option<String>,

        /// Candles per symbol, 1 to 1000
        #[arg(long)]
        limit: Option<String>,

        /// Maximum number of symbols
        #[arg(long)]
        top: Option<usize>,

        /// How symbols are chosen
        #[arg(long, value_enum)]
        policy: Option<SelectionPolicy>,

        /// Disable ANSI colours
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match cli.command {
        // Reports go to stdout; keep logs out of the way.
        Commands::Scan { .. } => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        Commands::Serve { .. } => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    // ── 2. Runtime config ────────────────────────────────────────────────
    let config_path = cli
        .config
        .or_else(|| std::env::var_os("BATTLE_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %format!("{e:#}"), "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides();

    // ── 3. Exchange client ───────────────────────────────────────────────
    let limiter = Arc::new(RateLimitTracker::per_minute(config.request_weight_per_minute));
    let client = BinanceClient::new(&config, limiter.clone())?;

    match cli.command {
        Commands::Serve { bind } => serve(config, client, limiter, bind).await,
        Commands::Scan {
            timeframe,
            limit,
            top,
            policy,
            no_color,
        } => {
            if let Some(top) = top {
                config.max_symbols = top;
            }
            if let Some(policy) = policy {
                config.selection_policy = policy;
            }
            config.sanitize();
            scan(&config, &client, timeframe, limit, !no_color).await;
            Ok(())
        }
    }
}

// ── serve ────────────────────────────────────────────────────────────────────
async fn serve(
    config: RuntimeConfig,
    client: BinanceClient,
    limiter: Arc<RateLimitTracker>,
    bind: Option<String>,
) -> anyhow::Result<()> {
    let bind_addr = bind
        .or_else(|| std::env::var("BATTLE_BIND_ADDR").ok())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.into());

    let state = Arc::new(AppState::new(config, client, limiter));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "battle server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("battle server failed")
}

// ── scan ─────────────────────────────────────────────────────────────────────
async fn scan(
    config: &RuntimeConfig,
    client: &BinanceClient,
    timeframe: Option<String>,
    limit: Option<String>,
    color: bool,
) {
    let (request, warnings) =
        BattleRequest::from_inputs(timeframe.as_deref(), limit.as_deref(), config);
    info!(
        timeframe = %request.timeframe,
        limit = request.limit,
        max_symbols = request.max_symbols,
        policy = %request.policy,
        "scanning the battlefield"
    );

    let outcome = run_battle(client, &request, warnings).await;
    print!("{}", console::render_outcome(&outcome, color));
}

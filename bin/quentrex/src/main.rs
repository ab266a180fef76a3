mod feed;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use backtest::{assess, open_trade, Assessment, Backtester, MemoryJournal};
use common::{CandleFeed, Config, KillzoneClock, Ticker, TradeJournal};
use council::AccountState;
use feed::{FileFeed, FileJournal};

/// Candles handed to the live analysis pass.
const ANALYSIS_LOOKBACK: usize = 500;

#[derive(Parser, Debug)]
#[command(name = "quentrex", author, version, about = "ICT liquidity analysis, agent council and backtester")]
struct Cli {
    /// TOML config file; `QX_*` environment variables override it
    #[arg(short, long, global = true, env = "QX_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assess the latest bar and journal the trade if the council clears it
    Analyze {
        /// JSON array of candles, oldest first
        #[arg(long)]
        candles: String,

        /// Trades already taken in the current session
        #[arg(long, default_value = "0")]
        session_trades: u32,

        /// Flag a high-impact news window
        #[arg(long)]
        news: bool,

        /// Append executable trades to this JSON-lines file
        #[arg(long)]
        journal: Option<String>,
    },
    /// Replay the decision over a candle history and report metrics
    Backtest {
        /// JSON array of candles, oldest first
        #[arg(long)]
        candles: String,
    },
}

#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    ticker: &'a Ticker,
    assessment: &'a Assessment,
    executable: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    info!(symbol = %cfg.symbol, timeframe = %cfg.backtest.timeframe, "Quentrex starting");

    match cli.command {
        Command::Analyze { candles, session_trades, news, journal } => {
            analyze(cfg, &candles, session_trades, news, journal).await
        }
        Command::Backtest { candles } => run_backtest(cfg, &candles).await,
    }
}

async fn analyze(
    cfg: Config,
    path: &str,
    session_trades: u32,
    news: bool,
    journal_path: Option<String>,
) -> Result<()> {
    let feed = FileFeed::open(path)
        .await
        .with_context(|| format!("failed to read candles from {path}"))?;
    let candles = feed
        .candles(&cfg.symbol, cfg.backtest.timeframe, ANALYSIS_LOOKBACK)
        .await?;
    let ticker = feed.ticker(&cfg.symbol).await?;

    let account = AccountState {
        balance: cfg.backtest.initial_balance,
        session_trades,
    };
    let assessment = assess(&candles, &cfg, &KillzoneClock, account, news);
    info!(decision = ?assessment.decision, price = ticker.last_price, "Latest bar assessed");

    let journal: Arc<dyn TradeJournal> = match journal_path {
        Some(p) => Arc::new(FileJournal::new(p)),
        None => Arc::new(MemoryJournal::new()),
    };
    if assessment.is_take() {
        let id = common::Trade::generate_id();
        match open_trade(id, &cfg.symbol, &assessment, account.balance, cfg.backtest.risk_per_trade_pct) {
            Some(trade) => {
                journal.record(&trade).await?;
                info!(id = %trade.id, direction = %trade.direction, grade = %trade.grade, "Trade journaled");
            }
            None => warn!("Accepted setup had no stop distance; nothing journaled"),
        }
    }

    let output = AnalyzeOutput {
        ticker: &ticker,
        assessment: &assessment,
        executable: assessment.is_take(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_backtest(cfg: Config, path: &str) -> Result<()> {
    let feed = FileFeed::open(path)
        .await
        .with_context(|| format!("failed to read candles from {path}"))?;
    let candles = feed.all().to_vec();

    let report = tokio::task::spawn_blocking(move || Backtester::new(cfg).run(&candles))
        .await
        .context("backtest worker panicked")??;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

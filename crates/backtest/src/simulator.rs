use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use common::{
    ensure_len, Candle, Config, KillzoneClock, Result, Session, SessionClock, Trade,
};
use council::{AccountState, TradePlan};

use crate::assess::{Assessment, BarEvaluator, CouncilEvaluator, Decision};
use crate::metrics::BacktestMetrics;
use crate::outcome::resolve_outcome;

/// A run refuses windows shorter than this.
pub const MIN_CANDLES: usize = 100;
/// Index of the first candle that may be evaluated.
const WARMUP: usize = 50;
/// Only indices divisible by this are evaluated.
const EVAL_EVERY: usize = 15;
/// Candles at the end of the window never evaluated.
const TAIL_RESERVE: usize = 5;
/// Candles scanned for an exit after entry.
const OUTCOME_WINDOW: usize = 50;
/// Candles skipped after a trade is taken.
const COOLDOWN: usize = 20;

/// How many evaluated bars ended at each rejection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub evaluations: usize,
    pub outside_session: usize,
    pub no_setup: usize,
    pub reward_risk: usize,
    pub grade: usize,
    pub risk_gate: usize,
    pub zero_size: usize,
}

impl SkipCounts {
    fn record(&mut self, decision: Decision) {
        match decision {
            Decision::OutsideSession => self.outside_session += 1,
            Decision::NoSetup => self.no_setup += 1,
            Decision::RewardRiskTooLow => self.reward_risk += 1,
            Decision::GradeTooLow => self.grade += 1,
            Decision::RiskGate => self.risk_gate += 1,
            Decision::Take => {}
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub candles: usize,
    pub trades: Vec<Trade>,
    pub metrics: BacktestMetrics,
    pub skips: SkipCounts,
}

/// Walk-forward replay of the live decision over a historical window.
///
/// Each run owns its balance and trade list; runs never share state.
pub struct Backtester {
    config: Config,
    clock: Arc<dyn SessionClock>,
    evaluator: Arc<dyn BarEvaluator>,
}

impl Backtester {
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(KillzoneClock))
    }

    pub fn with_clock(config: Config, clock: Arc<dyn SessionClock>) -> Self {
        Self {
            config,
            clock,
            evaluator: Arc::new(CouncilEvaluator),
        }
    }

    /// Replace the per-bar decision, [`CouncilEvaluator`] by default.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn BarEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn run(&self, candles: &[Candle]) -> Result<BacktestReport> {
        if let Err(e) = ensure_len(candles, MIN_CANDLES) {
            warn!(candles = candles.len(), required = MIN_CANDLES, "Backtest refused");
            return Err(e);
        }

        let cfg = &self.config;
        let risk_pct = cfg.backtest.risk_per_trade_pct;
        let mut balance = cfg.backtest.initial_balance;
        let mut trades: Vec<Trade> = Vec::new();
        let mut session_trades: HashMap<(i64, Session), u32> = HashMap::new();
        let mut skips = SkipCounts::default();

        let end = candles.len() - TAIL_RESERVE;
        let mut i = WARMUP;
        while i < end {
            if i % EVAL_EVERY != 0 {
                i += 1;
                continue;
            }
            skips.evaluations += 1;

            let now = candles[i].time;
            let key = (self.clock.trading_day(now), self.clock.session_at(now).session());
            let account = AccountState {
                balance,
                session_trades: session_trades.get(&key).copied().unwrap_or(0),
            };
            let assessment = self.evaluator.evaluate(&candles[..=i], cfg, self.clock.as_ref(), account);
            if !assessment.is_take() {
                skips.record(assessment.decision);
                i += 1;
                continue;
            }

            let future = &candles[i + 1..(i + 1 + OUTCOME_WINDOW).min(candles.len())];
            let id = format!("bt-{:04}", trades.len() + 1);
            let Some(trade) = simulate_trade(id, &cfg.symbol, &assessment, balance, risk_pct, future) else {
                skips.zero_size += 1;
                i += 1;
                continue;
            };

            balance += trade.pnl();
            *session_trades.entry(key).or_insert(0) += 1;
            info!(
                id = %trade.id,
                direction = %trade.direction,
                grade = %trade.grade,
                entry = trade.entry,
                pnl = trade.pnl(),
                balance,
                "Backtest trade closed"
            );
            trades.push(trade);
            i += COOLDOWN;
        }

        let metrics = BacktestMetrics::calculate(&trades, cfg.backtest.initial_balance);
        info!(
            symbol = %cfg.symbol,
            trades = metrics.total_trades,
            win_rate = metrics.win_rate,
            net_pnl = metrics.net_pnl,
            max_drawdown_pct = metrics.max_drawdown_pct,
            "Backtest complete"
        );
        debug!(?skips, "Backtest skip counts");

        Ok(BacktestReport {
            symbol: cfg.symbol.clone(),
            candles: candles.len(),
            trades,
            metrics,
            skips,
        })
    }
}

/// Open a trade from an accepted assessment, sized so that a stop-out loses `risk_pct` of `balance`.
///
/// Returns `None` if the assessment carries no plan or council, or the plan has no stop distance.
pub fn open_trade(id: String, symbol: &str, assessment: &Assessment, balance: f64, risk_pct: f64) -> Option<Trade> {
    let plan = assessment.plan.as_ref()?;
    let council = assessment.council.as_ref()?;
    let risk = plan.risk();
    if risk <= 0.0 {
        return None;
    }

    Some(Trade {
        id,
        symbol: symbol.to_string(),
        direction: plan.direction,
        grade: council.grade,
        consensus_score: council.consensus_score,
        session: assessment.session.session(),
        entry: plan.entry,
        stop: plan.stop,
        target1: plan.target1,
        target2: plan.target2,
        size: balance * risk_pct / 100.0 / risk,
        entry_time: assessment.time,
        exit: None,
    })
}

/// [`open_trade`], then close it against the `future` candles.
pub fn simulate_trade(
    id: String,
    symbol: &str,
    assessment: &Assessment,
    balance: f64,
    risk_pct: f64,
    future: &[Candle],
) -> Option<Trade> {
    let mut trade = open_trade(id, symbol, assessment, balance, risk_pct)?;
    let plan: &TradePlan = assessment.plan.as_ref()?;
    let (outcome, price, time) = resolve_outcome(plan, future, assessment.time);
    trade.close(outcome, price, time);
    Some(trade)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

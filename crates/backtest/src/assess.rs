use serde::Serialize;
use tracing::debug;

use analysis::{resample, MarketAnalysis, SweepFvgSetup};
use common::{Candle, Config, SessionClock, SessionStatus};
use council::{AccountState, AgentContext, AgentCouncil, TradePlan};

/// Outcome of one bar's evaluation, in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    OutsideSession,
    NoSetup,
    RewardRiskTooLow,
    GradeTooLow,
    RiskGate,
    Take,
}

/// Everything decided about the latest bar of a candle slice.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub time: i64,
    pub session: SessionStatus,
    pub setup: Option<SweepFvgSetup>,
    pub plan: Option<TradePlan>,
    pub council: Option<AgentCouncil>,
    pub decision: Decision,
}

impl Assessment {
    fn skip(time: i64, session: SessionStatus, decision: Decision) -> Self {
        Self {
            time,
            session,
            setup: None,
            plan: None,
            council: None,
            decision,
        }
    }

    pub fn is_take(&self) -> bool {
        self.decision == Decision::Take
    }
}

/// Run the analysis pipeline and the council on the last bar of `candles`.
///
/// Checks run in order: active session, best setup, reward:risk to target 1,
/// then the council's grade and hard risk gates.
pub fn assess(
    candles: &[Candle],
    cfg: &Config,
    clock: &dyn SessionClock,
    account: AccountState,
    news_window: bool,
) -> Assessment {
    let Some(last) = candles.last() else {
        return Assessment::skip(0, SessionStatus::Closed, Decision::NoSetup);
    };
    let session = clock.session_at(last.time);
    if !session.is_active() {
        return Assessment::skip(last.time, session, Decision::OutsideSession);
    }

    let analysis = analyze(candles, cfg);
    let Some(setup) = analysis.best_setup().copied() else {
        return Assessment::skip(last.time, session, Decision::NoSetup);
    };

    let plan = TradePlan::from_setup(&setup, last.close);
    if !plan.passes_reward_risk() {
        debug!(rr = plan.reward_risk(), "Setup rejected on reward:risk");
        return Assessment {
            setup: Some(setup),
            plan: Some(plan),
            ..Assessment::skip(last.time, session, Decision::RewardRiskTooLow)
        };
    }

    let ctx = AgentContext {
        candles,
        analysis: &analysis,
        direction: setup.direction,
        plan: &plan,
        account,
        session,
        news_window,
    };
    let council = AgentCouncil::evaluate(&ctx);
    let decision = if council.risk_gate.is_some() {
        Decision::RiskGate
    } else if !council.grade.is_tradeable() {
        Decision::GradeTooLow
    } else {
        Decision::Take
    };

    Assessment {
        time: last.time,
        session,
        setup: Some(setup),
        plan: Some(plan),
        council: Some(council),
        decision,
    }
}

/// Produces the decision for the last bar of a candle slice during a replay.
pub trait BarEvaluator: Send + Sync {
    fn evaluate(
        &self,
        candles: &[Candle],
        cfg: &Config,
        clock: &dyn SessionClock,
        account: AccountState,
    ) -> Assessment;
}

/// The full analysis and council decision. Backtests never open a news window.
#[derive(Debug, Clone, Copy, Default)]
pub struct CouncilEvaluator;

impl BarEvaluator for CouncilEvaluator {
    fn evaluate(
        &self,
        candles: &[Candle],
        cfg: &Config,
        clock: &dyn SessionClock,
        account: AccountState,
    ) -> Assessment {
        assess(candles, cfg, clock, account, false)
    }
}

/// Pipeline pass with higher-timeframe liquidity when the resample factor maps to a listed timeframe.
pub fn analyze(candles: &[Candle], cfg: &Config) -> MarketAnalysis {
    let timeframe = cfg.backtest.timeframe;
    match cfg.backtest.higher_timeframe() {
        Some(higher_tf) => {
            let higher = resample(candles, cfg.backtest.higher_timeframe_factor);
            MarketAnalysis::compute_with_higher(
                candles,
                &cfg.analysis,
                timeframe,
                Some((higher.as_slice(), higher_tf)),
            )
        }
        None => MarketAnalysis::compute(candles, &cfg.analysis, timeframe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{FixedClock, Session, Timeframe};

    fn flat(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle::new(i as i64 * 900_000, 100.0, 100.2, 99.8, 100.0, 10.0))
            .collect()
    }

    fn account() -> AccountState {
        AccountState { balance: 10_000.0, session_trades: 0 }
    }

    #[test]
    fn closed_session_skips_before_analysis() {
        let a = assess(&flat(60), &Config::default(), &FixedClock(SessionStatus::Closed), account(), false);
        assert_eq!(a.decision, Decision::OutsideSession);
        assert!(a.setup.is_none());
        assert!(!a.is_take());
    }

    #[test]
    fn flat_market_has_no_setup() {
        let clock = FixedClock(SessionStatus::Active { session: Session::London, minutes_remaining: 120 });
        let a = assess(&flat(60), &Config::default(), &clock, account(), false);
        assert_eq!(a.decision, Decision::NoSetup);
        assert_eq!(a.time, 59 * 900_000);
    }

    #[test]
    fn empty_slice_is_a_no_setup() {
        let a = assess(&[], &Config::default(), &FixedClock(SessionStatus::Closed), account(), false);
        assert_eq!(a.decision, Decision::NoSetup);
    }

    fn wave(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let close = 100.0 + 5.0 * (i as f64 / 6.0).sin();
                Candle::new(i as i64 * 900_000, close, close + 0.3, close - 0.3, close, 10.0)
            })
            .collect()
    }

    #[test]
    fn higher_levels_carry_the_resampled_timeframe() {
        let analysis = analyze(&wave(240), &Config::default());
        assert!(!analysis.higher_levels.is_empty());
        assert!(analysis.higher_levels.iter().all(|l| l.timeframe == Timeframe::H1));
    }

    #[test]
    fn unlisted_resample_interval_skips_higher_levels() {
        let mut cfg = Config::default();
        cfg.backtest.higher_timeframe_factor = 3;
        let analysis = analyze(&wave(240), &cfg);
        assert!(analysis.higher_levels.is_empty());
        assert!(!analysis.levels.is_empty());
    }
}

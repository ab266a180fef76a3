use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{Direction, Grade};

use crate::agents::{Agent, AgentSignal};
use crate::context::{AgentContext, HardRiskGate};

/// Bullish weight above this votes long.
const LONG_VOTE: f64 = 0.6;
/// Bullish weight below this votes short.
const SHORT_VOTE: f64 = 0.4;

/// Combined verdict of all five agents on one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCouncil {
    pub signals: Vec<AgentSignal>,
    pub consensus_score: f64,
    pub grade: Grade,
    /// `None` when the vote is split.
    pub direction: Option<Direction>,
    pub timestamp: DateTime<Utc>,
    /// Set when the risk agent hit a hard gate. Blocks execution whatever the grade.
    pub risk_gate: Option<HardRiskGate>,
}

impl AgentCouncil {
    pub fn evaluate(ctx: &AgentContext<'_>) -> Self {
        let signals: Vec<AgentSignal> = Agent::ALL.iter().map(|a| a.evaluate(ctx)).collect();
        let consensus_score = consensus_score(&signals);
        let grade = Grade::from_score(consensus_score);
        let direction = vote_direction(&signals);
        let risk_gate = HardRiskGate::check(&ctx.account);

        debug!(
            candidate = %ctx.direction,
            score = consensus_score,
            grade = %grade,
            vote = ?direction,
            gated = risk_gate.is_some(),
            "Council evaluated"
        );

        Self {
            signals,
            consensus_score,
            grade,
            direction,
            timestamp: DateTime::from_timestamp_millis(ctx.last_time()).unwrap_or_default(),
            risk_gate,
        }
    }

    pub fn signal(&self, agent: Agent) -> Option<&AgentSignal> {
        self.signals.iter().find(|s| s.agent == agent)
    }

    /// Tradeable grade and no hard risk gate.
    pub fn is_executable(&self) -> bool {
        self.risk_gate.is_none() && self.grade.is_tradeable()
    }
}

/// Weighted average of the agent scores; 0 when there is no weight.
pub fn consensus_score(signals: &[AgentSignal]) -> f64 {
    let total_weight: f64 = signals.iter().map(|s| s.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = signals.iter().map(|s| s.score * s.weight).sum();
    (weighted / total_weight).clamp(0.0, 100.0)
}

/// Direction backed by the bullish share of the weight, or `None` between the thresholds.
/// No weight means no vote.
pub fn vote_direction(signals: &[AgentSignal]) -> Option<Direction> {
    let total_weight: f64 = signals.iter().map(|s| s.weight).sum();
    if total_weight <= 0.0 {
        return None;
    }
    let bullish_weight: f64 = signals.iter().filter(|s| s.bullish).map(|s| s.weight).sum();
    let bullish = bullish_weight / total_weight;
    if bullish > LONG_VOTE {
        Some(Direction::Long)
    } else if bullish < SHORT_VOTE {
        Some(Direction::Short)
    } else {
        None
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

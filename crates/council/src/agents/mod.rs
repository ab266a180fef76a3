mod array;
mod execution;
mod liquidity;
mod risk;
mod structure;

use serde::{Deserialize, Serialize};

use common::Direction;

use crate::context::AgentContext;

/// The fixed set of evaluators. Weights sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agent {
    Structure,
    Liquidity,
    Array,
    Risk,
    Execution,
}

impl Agent {
    pub const ALL: [Agent; 5] = [
        Agent::Structure,
        Agent::Liquidity,
        Agent::Array,
        Agent::Risk,
        Agent::Execution,
    ];

    pub fn weight(self) -> f64 {
        match self {
            Agent::Structure => 0.25,
            Agent::Liquidity => 0.25,
            Agent::Array => 0.20,
            Agent::Risk => 0.15,
            Agent::Execution => 0.15,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Agent::Structure => "structure",
            Agent::Liquidity => "liquidity",
            Agent::Array => "array",
            Agent::Risk => "risk",
            Agent::Execution => "execution",
        }
    }

    /// Score the candidate trade described by `ctx`.
    pub fn evaluate(self, ctx: &AgentContext<'_>) -> AgentSignal {
        let mut card = Scorecard::default();
        match self {
            Agent::Structure => structure::score(ctx, &mut card),
            Agent::Liquidity => liquidity::score(ctx, &mut card),
            Agent::Array => array::score(ctx, &mut card),
            Agent::Risk => risk::score(ctx, &mut card),
            Agent::Execution => execution::score(ctx, &mut card),
        }
        card.finish(self, ctx.direction)
    }
}

impl std::fmt::Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One agent's verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSignal {
    pub agent: Agent,
    /// 0–100.
    pub score: f64,
    /// True when the agent leans long: a high score on a long or a low score on a short.
    pub bullish: bool,
    pub weight: f64,
    pub reasons: Vec<String>,
}

impl AgentSignal {
    pub fn new(agent: Agent, score: f64, direction: Direction, reasons: Vec<String>) -> Self {
        let score = if score.is_finite() { score.clamp(0.0, 100.0) } else { 0.0 };
        Self {
            agent,
            score,
            bullish: (direction == Direction::Long) == (score >= 50.0),
            weight: agent.weight(),
            reasons,
        }
    }
}

/// Running tally an agent adds points and reasons to.
#[derive(Debug, Default)]
pub(crate) struct Scorecard {
    score: f64,
    reasons: Vec<String>,
    /// Set by a hard gate; later adjustments are ignored.
    zeroed: bool,
}

impl Scorecard {
    pub(crate) fn add(&mut self, points: f64, reason: impl Into<String>) {
        if self.zeroed {
            return;
        }
        self.score += points;
        self.reasons.push(reason.into());
    }

    /// Pin the score at 0.
    pub(crate) fn zero(&mut self, reason: impl Into<String>) {
        self.score = 0.0;
        self.zeroed = true;
        self.reasons.push(reason.into());
    }

    fn finish(self, agent: Agent, direction: Direction) -> AgentSignal {
        AgentSignal::new(agent, self.score, direction, self.reasons)
    }
}

/// Whether `level_price` lies on the side of `price` a trade in `direction` runs towards.
pub(crate) fn ahead_of(direction: Direction, price: f64, level_price: f64) -> bool {
    match direction {
        Direction::Long => level_price > price,
        Direction::Short => level_price < price,
    }
}

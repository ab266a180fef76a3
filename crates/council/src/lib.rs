//! Five weighted agents scoring a candidate trade, and the consensus that
//! turns their scores into a grade and a direction.

pub mod agents;
pub mod consensus;
pub mod context;
pub mod plan;

pub use agents::{Agent, AgentSignal};
pub use consensus::{consensus_score, vote_direction, AgentCouncil};
pub use context::{AccountState, AgentContext, HardRiskGate, MAX_TRADES_PER_SESSION, MIN_BALANCE};
pub use plan::{TradePlan, MIN_REWARD_RISK, VOLATILITY_PROXY};

use serde::{Deserialize, Serialize};

use analysis::MarketAnalysis;
use common::{Candle, Direction, SessionStatus};

use crate::plan::TradePlan;

/// Below this balance nothing executes.
pub const MIN_BALANCE: f64 = 100.0;
/// Trades allowed per session window.
pub const MAX_TRADES_PER_SESSION: u32 = 3;

/// Account figures the risk agent needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: f64,
    /// Trades already taken in the current session window.
    pub session_trades: u32,
}

/// Unconditional execution blocks raised by the risk agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum HardRiskGate {
    BalanceBelowMinimum { balance: f64, minimum: f64 },
    SessionTradeCap { trades: u32, cap: u32 },
}

impl HardRiskGate {
    pub fn check(account: &AccountState) -> Option<Self> {
        if account.balance < MIN_BALANCE {
            return Some(HardRiskGate::BalanceBelowMinimum {
                balance: account.balance,
                minimum: MIN_BALANCE,
            });
        }
        if account.session_trades >= MAX_TRADES_PER_SESSION {
            return Some(HardRiskGate::SessionTradeCap {
                trades: account.session_trades,
                cap: MAX_TRADES_PER_SESSION,
            });
        }
        None
    }
}

impl std::fmt::Display for HardRiskGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HardRiskGate::BalanceBelowMinimum { balance, minimum } => {
                write!(f, "balance {balance:.2} below minimum {minimum:.2}")
            }
            HardRiskGate::SessionTradeCap { trades, cap } => {
                write!(f, "session trade cap reached ({trades}/{cap})")
            }
        }
    }
}

/// Everything the agents look at for one candidate trade.
#[derive(Debug, Clone, Copy)]
pub struct AgentContext<'a> {
    pub candles: &'a [Candle],
    pub analysis: &'a MarketAnalysis,
    pub direction: Direction,
    pub plan: &'a TradePlan,
    pub account: AccountState,
    pub session: SessionStatus,
    /// A high-impact news window is open.
    pub news_window: bool,
}

impl AgentContext<'_> {
    pub fn last_close(&self) -> f64 {
        self.candles.last().map(|c| c.close).unwrap_or(self.analysis.last_price)
    }

    /// Time of the last candle, or 0 for an empty slice.
    pub fn last_time(&self) -> i64 {
        self.candles.last().map(|c| c.time).unwrap_or(self.analysis.last_time)
    }
}

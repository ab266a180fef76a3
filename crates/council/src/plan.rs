use serde::{Deserialize, Serialize};

use analysis::SweepFvgSetup;
use common::Direction;

/// Volatility proxy as a fraction of the last close; targets sit 2 and 4 proxies from entry.
pub const VOLATILITY_PROXY: f64 = 0.008;
/// Minimum reward:risk to target 1. Inclusive.
pub const MIN_REWARD_RISK: f64 = 2.0;

/// Entry, stop and the two profit targets of a candidate trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub direction: Direction,
    pub entry: f64,
    pub stop: f64,
    pub target1: f64,
    pub target2: f64,
}

impl TradePlan {
    pub fn from_setup(setup: &SweepFvgSetup, last_close: f64) -> Self {
        let v = VOLATILITY_PROXY * last_close;
        let sign = setup.direction.sign();
        Self {
            direction: setup.direction,
            entry: setup.entry,
            stop: setup.stop,
            target1: setup.entry + sign * 2.0 * v,
            target2: setup.entry + sign * 4.0 * v,
        }
    }

    /// Absolute distance from entry to stop.
    pub fn risk(&self) -> f64 {
        (self.entry - self.stop).abs()
    }

    /// Stop distance as a percent of entry; 0 for non-positive entries.
    pub fn stop_distance_pct(&self) -> f64 {
        if self.entry <= 0.0 {
            return 0.0;
        }
        self.risk() / self.entry * 100.0
    }

    /// Reward:risk to target 1, 0 when the stop sits on the entry.
    pub fn reward_risk(&self) -> f64 {
        self.reward_risk_to(self.target1)
    }

    pub fn reward_risk_to(&self, target: f64) -> f64 {
        let risk = self.risk();
        if risk <= 0.0 {
            return 0.0;
        }
        (target - self.entry).abs() / risk
    }

    pub fn passes_reward_risk(&self) -> bool {
        self.reward_risk() >= MIN_REWARD_RISK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(entry: f64, stop: f64, target1: f64) -> TradePlan {
        TradePlan {
            direction: Direction::Long,
            entry,
            stop,
            target1,
            target2: target1 + 2.0,
        }
    }

    #[test]
    fn reward_risk_boundary_is_inclusive() {
        let p = plan(100.0, 99.0, 102.0);
        assert_eq!(p.reward_risk(), 2.0);
        assert!(p.passes_reward_risk());
        let strict = p.reward_risk() > MIN_REWARD_RISK;
        assert!(!strict);
    }

    #[test]
    fn zero_stop_distance_gives_zero_ratio() {
        let p = plan(100.0, 100.0, 102.0);
        assert_eq!(p.reward_risk(), 0.0);
        assert!(!p.passes_reward_risk());
        assert_eq!(p.stop_distance_pct(), 0.0);
    }

    #[test]
    fn targets_follow_the_volatility_proxy() {
        use analysis::{LevelStatus, LiquidityLevel};
        use common::{SwingKind, Timeframe};

        let level = LiquidityLevel {
            price: 101.0,
            time: 0,
            index: 0,
            kind: SwingKind::High,
            status: LevelStatus::Swept { index: 3, time: 0 },
            strength: 45.0,
            timeframe: Timeframe::M15,
        };
        let setup = SweepFvgSetup {
            level,
            sweep_index: 3,
            sweep_wick: 101.5,
            displacement_index: 4,
            displacement_size: 0.01,
            gap_top: 100.5,
            gap_bottom: 99.5,
            entry: 100.0,
            stop: 101.7,
            direction: Direction::Short,
            quality: 70.0,
        };
        let p = TradePlan::from_setup(&setup, 100.0);
        assert!((p.target1 - 98.4).abs() < 1e-9);
        assert!((p.target2 - 96.8).abs() < 1e-9);
        assert!((p.stop_distance_pct() - 1.7).abs() < 1e-9);
    }
}

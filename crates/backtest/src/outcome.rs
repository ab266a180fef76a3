use common::{Candle, Direction, TradeOutcome};

use council::TradePlan;

/// Walk `future` candles and report the first exit touched, as `(outcome, price, time)`.
///
/// Each candle is checked for target 2, then target 1, then the stop. When
/// nothing triggers the trade is closed at the stop on the last candle scanned.
pub fn resolve_outcome(plan: &TradePlan, future: &[Candle], entry_time: i64) -> (TradeOutcome, f64, i64) {
    for c in future {
        let hit = match plan.direction {
            Direction::Long => {
                if c.high >= plan.target2 {
                    Some((TradeOutcome::Target2Hit, plan.target2))
                } else if c.high >= plan.target1 {
                    Some((TradeOutcome::Target1Hit, plan.target1))
                } else if c.low <= plan.stop {
                    Some((TradeOutcome::StopHit, plan.stop))
                } else {
                    None
                }
            }
            Direction::Short => {
                if c.low <= plan.target2 {
                    Some((TradeOutcome::Target2Hit, plan.target2))
                } else if c.low <= plan.target1 {
                    Some((TradeOutcome::Target1Hit, plan.target1))
                } else if c.high >= plan.stop {
                    Some((TradeOutcome::StopHit, plan.stop))
                } else {
                    None
                }
            }
        };
        if let Some((outcome, price)) = hit {
            return (outcome, price, c.time);
        }
    }
    let time = future.last().map(|c| c.time).unwrap_or(entry_time);
    (TradeOutcome::StopHit, plan.stop, time)
}

use analysis::LiquidityLevel;

use super::{ahead_of, Scorecard};
use crate::context::AgentContext;

/// Sweeps within this many candles of the last one count as recent.
const RECENT_SWEEP_CANDLES: usize = 30;
const STRONG_MAGNET: f64 = 60.0;

pub(super) fn score(ctx: &AgentContext<'_>, card: &mut Scorecard) {
    let Some(cutoff) = ctx
        .candles
        .get(ctx.candles.len().saturating_sub(RECENT_SWEEP_CANDLES))
        .map(|c| c.time)
    else {
        card.add(-20.0, "no candles to judge sweeps");
        return;
    };

    let aligned_recent = |l: &&LiquidityLevel| {
        l.sweep_bias() == ctx.direction && l.sweep_time().is_some_and(|t| t >= cutoff)
    };
    let sweeps: Vec<&LiquidityLevel> = ctx
        .analysis
        .levels
        .iter()
        .chain(&ctx.analysis.higher_levels)
        .filter(aligned_recent)
        .collect();

    if sweeps.is_empty() {
        card.add(-20.0, "no aligned sweep");
    } else {
        let avg = sweeps.iter().map(|l| l.strength).sum::<f64>() / sweeps.len() as f64;
        card.add(
            (avg * 0.4).min(40.0),
            format!("{} aligned sweep(s), avg strength {avg:.0}", sweeps.len()),
        );
        if sweeps.iter().any(|l| l.timeframe > ctx.analysis.timeframe) {
            card.add(25.0, "higher-timeframe sweep aligned");
        }
    }

    if let Some(top) = ctx.analysis.magnets.first() {
        let level = &top.level;
        if !level.is_swept()
            && level.strength >= STRONG_MAGNET
            && ahead_of(ctx.direction, ctx.last_close(), level.price)
        {
            card.add(20.0, format!("strong magnet at {:.4} ahead", level.price));
        }
    }
}

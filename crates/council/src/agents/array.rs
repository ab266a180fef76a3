use analysis::{OrderBlock, PdZone};
use common::Direction;

use super::Scorecard;
use crate::context::AgentContext;

/// Zones within this percent of the last close count as nearby.
const NEARBY_PCT: f64 = 1.0;
const HIGH_STRENGTH_BLOCK: f64 = 70.0;
/// Fill band treated as an optimal retest of a gap.
const RETEST_BAND: std::ops::RangeInclusive<f64> = 30.0..=60.0;

pub(super) fn score(ctx: &AgentContext<'_>, card: &mut Scorecard) {
    let price = ctx.last_close();
    let analysis = ctx.analysis;

    let blocks: Vec<&OrderBlock> = analysis
        .order_blocks
        .iter()
        .filter(|b| b.direction == ctx.direction && !b.is_mitigated())
        .filter(|b| b.distance_pct(price) <= NEARBY_PCT)
        .collect();
    if !blocks.is_empty() {
        card.add(
            (15.0 * blocks.len() as f64).min(30.0),
            format!("{} nearby order block(s)", blocks.len()),
        );
    }

    let gap = analysis
        .fair_value_gaps
        .iter()
        .filter(|g| g.direction == ctx.direction && !g.is_filled())
        .filter(|g| g.distance_pct(price) <= NEARBY_PCT)
        .min_by(|a, b| a.distance_pct(price).total_cmp(&b.distance_pct(price)));
    if let Some(gap) = gap {
        card.add(25.0, format!("unfilled gap {:.4}-{:.4}", gap.bottom, gap.top));
        if RETEST_BAND.contains(&gap.fill_percent()) {
            card.add(10.0, format!("gap {:.0}% filled, optimal retest", gap.fill_percent()));
        }
    }

    if let Some(pd) = &analysis.pd_array {
        match (ctx.direction, pd.zone(price)) {
            (Direction::Long, PdZone::Discount) => card.add(25.0, "price in discount"),
            (Direction::Short, PdZone::Premium) => card.add(25.0, "price in premium"),
            (_, PdZone::Equilibrium) => card.add(10.0, "price at equilibrium"),
            _ => {}
        }
    }

    if blocks.iter().any(|b| b.strength >= HIGH_STRENGTH_BLOCK) {
        card.add(10.0, "high-strength order block");
    }
}

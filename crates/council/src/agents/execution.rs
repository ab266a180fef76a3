use super::Scorecard;
use crate::context::AgentContext;

/// Distance tiers (percent of entry) from entry to the nearest aligned gap midpoint.
const GAP_TIERS: [(f64, f64); 3] = [(0.1, 30.0), (0.3, 20.0), (0.5, 10.0)];
/// Distance tiers from entry to the nearest aligned order-block edge.
const BLOCK_TIERS: [(f64, f64); 2] = [(0.2, 25.0), (0.5, 10.0)];
const RECENT_CANDLES: usize = 3;

pub(super) fn score(ctx: &AgentContext<'_>, card: &mut Scorecard) {
    let plan = ctx.plan;
    precision(ctx, card);

    let stop_pct = plan.stop_distance_pct();
    if (0.5..=1.5).contains(&stop_pct) {
        card.add(20.0, format!("stop {stop_pct:.2}% in ideal band"));
    } else if stop_pct < 0.3 {
        card.add(-15.0, format!("stop {stop_pct:.2}% too tight"));
    } else if stop_pct > 2.5 {
        card.add(-10.0, format!("stop {stop_pct:.2}% too wide"));
    }

    let rr = plan.reward_risk();
    if rr >= 2.0 {
        card.add(20.0, format!("target R:R {rr:.2}"));
    }
    if rr >= 3.0 {
        card.add(15.0, "target at 3R or better");
    }

    let tail = &ctx.candles[ctx.candles.len().saturating_sub(RECENT_CANDLES)..];
    let with = tail.iter().filter(|c| c.moved_with(ctx.direction)).count();
    if with >= 2 {
        card.add(15.0, format!("{with}/{} recent candles with the trade", tail.len()));
    }
}

/// Reward an entry sitting on a known imbalance midpoint, or failing that an order-block edge.
fn precision(ctx: &AgentContext<'_>, card: &mut Scorecard) {
    let entry = ctx.plan.entry;
    if entry <= 0.0 {
        return;
    }
    let pct = |level: f64| (entry - level).abs() / entry * 100.0;

    let gap_distance = ctx
        .analysis
        .fair_value_gaps
        .iter()
        .filter(|g| g.direction == ctx.direction && !g.is_filled())
        .map(|g| pct(g.midpoint))
        .min_by(f64::total_cmp);
    if let Some(d) = gap_distance {
        if let Some(&(_, points)) = GAP_TIERS.iter().find(|(limit, _)| d <= *limit) {
            card.add(points, format!("entry {d:.2}% from gap midpoint"));
            return;
        }
    }

    let block_distance = ctx
        .analysis
        .order_blocks
        .iter()
        .filter(|b| b.direction == ctx.direction && !b.is_mitigated())
        .map(|b| pct(b.entry_edge()))
        .min_by(f64::total_cmp);
    if let Some(d) = block_distance {
        if let Some(&(_, points)) = BLOCK_TIERS.iter().find(|(limit, _)| d <= *limit) {
            card.add(points, format!("entry {d:.2}% from order block edge"));
        }
    }
}

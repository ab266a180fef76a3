use analysis::StructureKind;

use super::Scorecard;
use crate::context::AgentContext;

/// Structure events considered recent.
const RECENT_EVENTS: usize = 5;
const POINTS_PER_ALIGNED: f64 = 12.0;
const ALIGNED_CAP: f64 = 40.0;
const MOMENTUM_WINDOW: usize = 5;
const MOMENTUM_MIN: usize = 3;

pub(super) fn score(ctx: &AgentContext<'_>, card: &mut Scorecard) {
    let events = &ctx.analysis.structure;
    let recent = &events[events.len().saturating_sub(RECENT_EVENTS)..];

    let aligned = recent.iter().filter(|e| e.direction == ctx.direction).count();
    if aligned > 0 {
        card.add(
            (POINTS_PER_ALIGNED * aligned as f64).min(ALIGNED_CAP),
            format!("{aligned}/{} recent breaks aligned", recent.len()),
        );
    }

    if let Some(latest) = recent.last() {
        if latest.direction == ctx.direction {
            card.add(20.0, "latest break aligned");
        } else {
            card.add(-10.0, "latest break opposed");
        }
    }

    if recent.iter().any(|e| e.kind == StructureKind::Choch) {
        card.add(15.0, "change of character present");
    }

    if recent.iter().any(|e| e.direction == ctx.direction && e.confirmed) {
        card.add(15.0, "aligned break confirmed by close");
    }

    let tail = &ctx.candles[ctx.candles.len().saturating_sub(MOMENTUM_WINDOW)..];
    let with = tail.iter().filter(|c| c.moved_with(ctx.direction)).count();
    if with >= MOMENTUM_MIN {
        card.add(10.0, format!("momentum {with}/{}", tail.len()));
    }
}

use common::SessionStatus;

use super::Scorecard;
use crate::context::{AgentContext, HardRiskGate};

/// Fewer minutes than this left in a session is late.
const LATE_SESSION_MINUTES: u32 = 15;

pub(super) fn score(ctx: &AgentContext<'_>, card: &mut Scorecard) {
    if let Some(gate) = HardRiskGate::check(&ctx.account) {
        card.zero(format!("blocked: {gate}"));
        return;
    }

    match ctx.session {
        SessionStatus::Active { session, minutes_remaining } => {
            card.add(40.0, format!("{session} session active"));
            if session.is_peak_volume() {
                card.add(10.0, "peak-volume session");
            }
            if minutes_remaining < LATE_SESSION_MINUTES {
                card.add(-15.0, format!("only {minutes_remaining} min left in session"));
            }
        }
        SessionStatus::Closed => card.add(-30.0, "outside trading sessions"),
    }

    let rr = ctx.plan.reward_risk();
    if rr >= 3.0 {
        card.add(25.0, format!("R:R {rr:.2}"));
    } else if rr >= 2.0 {
        card.add(15.0, format!("R:R {rr:.2}"));
    } else {
        card.add(-20.0, format!("R:R {rr:.2} below 2"));
    }

    if ctx.news_window {
        card.add(-20.0, "news window");
    }

    if ctx.account.session_trades == 0 {
        card.add(10.0, "first trade of the session");
    }
}

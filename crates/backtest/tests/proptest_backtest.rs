use backtest::{profit_factor, resolve_outcome, BacktestMetrics, PROFIT_FACTOR_SENTINEL};
use common::{Candle, Direction, Grade, Session, Trade, TradeOutcome};
use council::TradePlan;
use proptest::prelude::*;

fn closed_trade(pnl: f64, session: Session) -> Trade {
    let mut t = Trade {
        id: Trade::generate_id(),
        symbol: "SOLUSDT".into(),
        direction: Direction::Long,
        grade: Grade::A,
        consensus_score: 82.0,
        session,
        entry: 100.0,
        stop: 99.0,
        target1: 102.0,
        target2: 104.0,
        size: 1.0,
        entry_time: 0,
        exit: None,
    };
    t.close(TradeOutcome::Target1Hit, 100.0 + pnl, 1);
    t
}

fn session_strategy() -> impl Strategy<Value = Session> {
    prop::sample::select(Session::ALL.to_vec())
}

proptest! {
    /// Loss-free runs report the sentinel; a run with nothing on either side reports 0.
    #[test]
    fn profit_factor_edges(gross_profit in 0.0f64..1e6, gross_loss in 0.0f64..1e6) {
        let pf = profit_factor(gross_profit, gross_loss);
        prop_assert!(pf.is_finite() && pf >= 0.0);
        prop_assert_eq!(profit_factor(gross_profit.max(1e-9), 0.0), PROFIT_FACTOR_SENTINEL);
        prop_assert_eq!(profit_factor(0.0, 0.0), 0.0);
        if gross_loss > 0.0 {
            prop_assert!((pf - gross_profit / gross_loss).abs() < 1e-9 * pf.max(1.0));
        }
    }

    /// Counts, session buckets and drawdown stay consistent for any trade list.
    #[test]
    fn metrics_are_consistent(
        rows in prop::collection::vec((-500.0f64..500.0, session_strategy()), 0..60),
        initial in 1_000.0f64..100_000.0,
    ) {
        let trades: Vec<Trade> = rows.iter().map(|(p, s)| closed_trade(*p, *s)).collect();
        let m = BacktestMetrics::calculate(&trades, initial);

        prop_assert_eq!(m.wins + m.losses, trades.len());
        prop_assert!((0.0..=100.0).contains(&m.win_rate));
        prop_assert!(m.max_drawdown >= 0.0);
        prop_assert!(m.max_drawdown_pct >= 0.0);
        prop_assert!(m.sharpe_ratio.is_finite());
        prop_assert!((m.final_balance - initial - m.net_pnl).abs() < 1e-6);

        let session_trades: usize = Session::ALL.iter().map(|s| m.by_session.get(*s).trades).sum();
        let session_pnl: f64 = Session::ALL.iter().map(|s| m.by_session.get(*s).pnl).sum();
        prop_assert_eq!(session_trades, trades.len());
        prop_assert!((session_pnl - m.net_pnl).abs() < 1e-6);
    }

    /// The resolved exit is always one of the plan's three prices.
    #[test]
    fn exits_land_on_plan_prices(
        long in any::<bool>(),
        bars in prop::collection::vec((95.0f64..105.0, 0.0f64..4.0, 0.0f64..4.0), 0..50),
    ) {
        let direction = if long { Direction::Long } else { Direction::Short };
        let s = direction.sign();
        let plan = TradePlan {
            direction,
            entry: 100.0,
            stop: 100.0 - s,
            target1: 100.0 + 2.0 * s,
            target2: 100.0 + 4.0 * s,
        };
        let future: Vec<Candle> = bars
            .iter()
            .enumerate()
            .map(|(i, (mid, up, down))| Candle::new(i as i64, *mid, mid + up, mid - down, *mid, 1.0))
            .collect();
        let (outcome, price, _) = resolve_outcome(&plan, &future, -1);
        let expected = match outcome {
            TradeOutcome::Target2Hit => plan.target2,
            TradeOutcome::Target1Hit => plan.target1,
            TradeOutcome::StopHit => plan.stop,
        };
        prop_assert_eq!(price, expected);
    }
}

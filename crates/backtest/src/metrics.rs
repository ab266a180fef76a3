use serde::Serialize;

use common::{Session, Trade};

/// Profit factor reported when there are wins and no losses.
pub const PROFIT_FACTOR_SENTINEL: f64 = 999.0;
/// Annualisation constant applied to the per-trade Sharpe ratio.
const SHARPE_ANNUALISATION: f64 = 252.0;

/// Trade count, wins and P&L for one session bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub trades: usize,
    pub wins: usize,
    pub pnl: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SessionBreakdown {
    pub asia: SessionStats,
    pub london: SessionStats,
    pub new_york: SessionStats,
    pub other: SessionStats,
}

impl SessionBreakdown {
    pub fn get(&self, session: Session) -> &SessionStats {
        match session {
            Session::Asia => &self.asia,
            Session::London => &self.london,
            Session::NewYork => &self.new_york,
            Session::Other => &self.other,
        }
    }

    fn get_mut(&mut self, session: Session) -> &mut SessionStats {
        match session {
            Session::Asia => &mut self.asia,
            Session::London => &mut self.london,
            Session::NewYork => &mut self.new_york,
            Session::Other => &mut self.other,
        }
    }
}

/// Summary statistics over a finished, chronologically ordered trade list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BacktestMetrics {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percent of trades with positive P&L.
    pub win_rate: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub net_pnl: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub max_consecutive_wins: u32,
    pub max_consecutive_losses: u32,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    /// Drawdown as a percent of the peak it fell from.
    pub max_drawdown_pct: f64,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub return_pct: f64,
    pub by_session: SessionBreakdown,
}

impl BacktestMetrics {
    pub fn calculate(trades: &[Trade], initial_balance: f64) -> Self {
        let pnls: Vec<f64> = trades.iter().map(Trade::pnl).collect();
        let total_trades = trades.len();
        let wins = pnls.iter().filter(|p| **p > 0.0).count();
        let losses = total_trades - wins;

        let gross_profit: f64 = pnls.iter().filter(|p| **p > 0.0).sum();
        let gross_loss: f64 = pnls.iter().filter(|p| **p <= 0.0).map(|p| p.abs()).sum();
        let net_pnl: f64 = pnls.iter().sum();

        let mut by_session = SessionBreakdown::default();
        for trade in trades {
            let bucket = by_session.get_mut(trade.session);
            bucket.trades += 1;
            bucket.pnl += trade.pnl();
            if trade.is_win() {
                bucket.wins += 1;
            }
        }

        let (max_drawdown, max_drawdown_pct) = max_drawdown(initial_balance, &pnls);
        let (max_consecutive_wins, max_consecutive_losses) = streaks(&pnls);
        let final_balance = initial_balance + net_pnl;

        Self {
            total_trades,
            wins,
            losses,
            win_rate: ratio(wins as f64, total_trades as f64) * 100.0,
            gross_profit,
            gross_loss,
            net_pnl,
            profit_factor: profit_factor(gross_profit, gross_loss),
            avg_win: ratio(gross_profit, wins as f64),
            avg_loss: ratio(gross_loss, losses as f64),
            largest_win: pnls.iter().copied().fold(0.0, f64::max),
            largest_loss: pnls.iter().copied().fold(0.0, f64::min).abs(),
            max_consecutive_wins,
            max_consecutive_losses,
            sharpe_ratio: sharpe_ratio(&pnls),
            max_drawdown,
            max_drawdown_pct,
            initial_balance,
            final_balance,
            return_pct: ratio(net_pnl, initial_balance) * 100.0,
            by_session,
        }
    }
}

/// Gross wins over gross losses, with the sentinel for loss-free runs and 0 for empty ones.
pub fn profit_factor(gross_profit: f64, gross_loss: f64) -> f64 {
    if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        PROFIT_FACTOR_SENTINEL
    } else {
        0.0
    }
}

/// Mean over population stdev of per-trade P&L, scaled by √252.
fn sharpe_ratio(pnls: &[f64]) -> f64 {
    if pnls.len() < 2 {
        return 0.0;
    }
    let n = pnls.len() as f64;
    let mean = pnls.iter().sum::<f64>() / n;
    let variance = pnls.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    if std_dev > 0.0 {
        mean / std_dev * SHARPE_ANNUALISATION.sqrt()
    } else {
        0.0
    }
}

/// Largest peak-to-trough fall of the running balance, in currency and percent of that peak.
fn max_drawdown(initial_balance: f64, pnls: &[f64]) -> (f64, f64) {
    let mut balance = initial_balance;
    let mut peak = initial_balance;
    let mut worst = (0.0, 0.0);
    for pnl in pnls {
        balance += pnl;
        peak = peak.max(balance);
        let dd = peak - balance;
        if dd > worst.0 {
            worst = (dd, ratio(dd, peak) * 100.0);
        }
    }
    worst
}

fn streaks(pnls: &[f64]) -> (u32, u32) {
    let (mut wins, mut losses) = (0u32, 0u32);
    let (mut best_wins, mut best_losses) = (0u32, 0u32);
    for pnl in pnls {
        if *pnl > 0.0 {
            wins += 1;
            losses = 0;
        } else {
            losses += 1;
            wins = 0;
        }
        best_wins = best_wins.max(wins);
        best_losses = best_losses.max(losses);
    }
    (best_wins, best_losses)
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Direction, Grade, TradeOutcome};

    fn trade(pnl: f64, session: Session) -> Trade {
        let mut t = Trade {
            id: "bt-0001".into(),
            symbol: "SOLUSDT".into(),
            direction: Direction::Long,
            grade: Grade::A,
            consensus_score: 85.0,
            session,
            entry: 100.0,
            stop: 99.0,
            target1: 102.0,
            target2: 104.0,
            size: 1.0,
            entry_time: 0,
            exit: None,
        };
        let outcome = if pnl > 0.0 { TradeOutcome::Target1Hit } else { TradeOutcome::StopHit };
        t.close(outcome, 100.0 + pnl, 1);
        t
    }

    #[test]
    fn profit_factor_sentinel_and_zero() {
        assert_eq!(profit_factor(100.0, 0.0), PROFIT_FACTOR_SENTINEL);
        assert_eq!(profit_factor(100.0, 0.0), 999.0);
        assert_eq!(profit_factor(0.0, 0.0), 0.0);
        assert_eq!(profit_factor(0.0, 50.0), 0.0);
        assert!((profit_factor(150.0, 50.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_run_is_all_zero() {
        let m = BacktestMetrics::calculate(&[], 10_000.0);
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.profit_factor, 0.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.final_balance, 10_000.0);
    }

    #[test]
    fn mixed_run() {
        let trades = vec![
            trade(200.0, Session::London),
            trade(-100.0, Session::London),
            trade(-100.0, Session::NewYork),
            trade(300.0, Session::Asia),
        ];
        let m = BacktestMetrics::calculate(&trades, 1_000.0);
        assert_eq!((m.wins, m.losses), (2, 2));
        assert_eq!(m.win_rate, 50.0);
        assert_eq!(m.gross_profit, 500.0);
        assert_eq!(m.gross_loss, 200.0);
        assert_eq!(m.profit_factor, 2.5);
        assert_eq!(m.net_pnl, 300.0);
        assert_eq!(m.final_balance, 1_300.0);
        assert_eq!(m.max_consecutive_losses, 2);
        // peak 1200 after the first trade, trough 1000
        assert_eq!(m.max_drawdown, 200.0);
        assert!((m.max_drawdown_pct - 200.0 / 1200.0 * 100.0).abs() < 1e-9);
        assert_eq!(m.by_session.london, SessionStats { trades: 2, wins: 1, pnl: 100.0 });
        assert_eq!(m.by_session.get(Session::NewYork).trades, 1);
        assert_eq!(m.by_session.other.trades, 0);

        // mean 75, population variance 31875
        let expected = 75.0 / 31_875f64.sqrt() * 252f64.sqrt();
        assert!((m.sharpe_ratio - expected).abs() < 1e-9);
    }

    #[test]
    fn single_trade_has_no_sharpe() {
        let m = BacktestMetrics::calculate(&[trade(50.0, Session::Asia)], 1_000.0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.profit_factor, PROFIT_FACTOR_SENTINEL);
    }
}

use serde::{Deserialize, Serialize};

use common::{Candle, Direction};

use super::order_block::distance_to_range_pct;

/// Fill lifecycle of a gap: unfilled → partially filled → filled.
///
/// Penetration only ever increases and `Filled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FillState {
    Unfilled,
    Partial { percent: f64 },
    Filled { index: usize, time: i64 },
}

impl FillState {
    pub fn percent(&self) -> f64 {
        match self {
            FillState::Unfilled => 0.0,
            FillState::Partial { percent } => *percent,
            FillState::Filled { .. } => 100.0,
        }
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, FillState::Filled { .. })
    }

    /// Record a penetration of `percent`. Shallower readings are ignored and
    /// anything at or beyond 100 pins the state at `Filled`.
    pub fn advance(&mut self, percent: f64, index: usize, time: i64) {
        if self.is_filled() || percent <= self.percent() {
            return;
        }
        *self = if percent >= 100.0 {
            FillState::Filled { index, time }
        } else {
            FillState::Partial { percent }
        };
    }
}

/// Three-candle imbalance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairValueGap {
    pub top: f64,
    pub bottom: f64,
    pub midpoint: f64,
    pub direction: Direction,
    /// Index of the middle candle.
    pub index: usize,
    pub time: i64,
    pub state: FillState,
}

impl FairValueGap {
    pub fn new(direction: Direction, top: f64, bottom: f64, index: usize, time: i64) -> Self {
        Self {
            top,
            bottom,
            midpoint: (top + bottom) / 2.0,
            direction,
            index,
            time,
            state: FillState::Unfilled,
        }
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn fill_percent(&self) -> f64 {
        self.state.percent()
    }

    pub fn is_filled(&self) -> bool {
        self.state.is_filled()
    }

    pub fn distance_pct(&self, price: f64) -> f64 {
        distance_to_range_pct(price, self.bottom, self.top)
    }
}

/// Gap between the outer candles of a three-candle window, if it clears
/// `min_gap_pct` percent of the first candle's edge. Returns `(direction, top, bottom)`.
pub fn gap_between(prev: &Candle, next: &Candle, min_gap_pct: f64) -> Option<(Direction, f64, f64)> {
    let bull_gap = next.low - prev.high;
    if bull_gap > 0.0 && bull_gap >= prev.high * min_gap_pct / 100.0 {
        return Some((Direction::Long, next.low, prev.high));
    }
    let bear_gap = prev.low - next.high;
    if bear_gap > 0.0 && bear_gap >= prev.low * min_gap_pct / 100.0 {
        return Some((Direction::Short, prev.low, next.high));
    }
    None
}

/// Scan every three-candle window for gaps and track how far later price filled them.
pub fn detect_fvgs(candles: &[Candle], min_gap_pct: f64) -> Vec<FairValueGap> {
    if candles.len() < 3 {
        return Vec::new();
    }
    let mut gaps = Vec::new();
    for i in 1..candles.len() - 1 {
        if let Some((direction, top, bottom)) =
            gap_between(&candles[i - 1], &candles[i + 1], min_gap_pct)
        {
            let mut gap = FairValueGap::new(direction, top, bottom, i, candles[i].time);
            track_fill(candles, &mut gap);
            gaps.push(gap);
        }
    }
    gaps
}

fn track_fill(candles: &[Candle], gap: &mut FairValueGap) {
    let height = gap.height();
    if height <= 0.0 {
        return;
    }
    for (k, c) in candles.iter().enumerate().skip(gap.index + 2) {
        let depth = match gap.direction {
            Direction::Long => gap.top - c.low,
            Direction::Short => c.high - gap.bottom,
        };
        if depth > 0.0 {
            gap.state.advance((depth / height * 100.0).min(100.0), k, c.time);
        }
        if gap.is_filled() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(i: usize, o: f64, h: f64, l: f64, c: f64) -> Candle {
        Candle::new(i as i64 * 60_000, o, h, l, c, 1.0)
    }

    #[test]
    fn three_candle_bullish_gap() {
        let candles = vec![
            candle(0, 99.5, 100.0, 99.0, 99.8),
            candle(1, 97.8, 98.0, 97.5, 97.6),
            candle(2, 102.6, 103.0, 102.5, 102.9),
        ];
        let gaps = detect_fvgs(&candles, 0.05);
        assert_eq!(gaps.len(), 1);
        let gap = gaps[0];
        assert_eq!(gap.direction, Direction::Long);
        assert_eq!(gap.top, 102.5);
        assert_eq!(gap.bottom, 100.0);
        assert_eq!(gap.midpoint, 101.25);
        assert_eq!(gap.state, FillState::Unfilled);
    }

    #[test]
    fn gap_below_minimum_is_ignored() {
        let prev = candle(0, 99.5, 100.0, 99.0, 99.8);
        let next = candle(2, 100.1, 100.5, 100.02, 100.4);
        assert!(gap_between(&prev, &next, 0.05).is_none());
        assert!(gap_between(&prev, &next, 0.01).is_some());
    }

    #[test]
    fn partial_then_full_fill() {
        let candles = vec![
            candle(0, 99.5, 100.0, 99.0, 99.8),
            candle(1, 100.0, 103.0, 99.9, 102.8),
            candle(2, 102.8, 104.0, 102.0, 103.5),
            candle(3, 103.5, 104.0, 101.0, 101.5),
            candle(4, 101.5, 102.0, 101.5, 101.8),
            candle(5, 101.8, 102.0, 99.5, 99.8),
        ];
        let gaps = detect_fvgs(&candles, 0.05);
        let gap = gaps.iter().find(|g| g.index == 1).unwrap();
        assert_eq!(gap.state, FillState::Filled { index: 5, time: 300_000 });
        assert_eq!(gap.fill_percent(), 100.0);

        let partial = detect_fvgs(&candles[..5], 0.05);
        let gap = partial.iter().find(|g| g.index == 1).unwrap();
        assert!((gap.fill_percent() - 50.0).abs() < 1e-9);
        assert!(!gap.is_filled());
    }

    #[test]
    fn bearish_gap_fills_from_below() {
        let candles = vec![
            candle(0, 101.0, 101.5, 100.0, 100.2),
            candle(1, 100.2, 100.3, 97.0, 97.2),
            candle(2, 97.2, 98.0, 96.5, 96.8),
            candle(3, 96.8, 99.5, 96.6, 99.2),
        ];
        let gaps = detect_fvgs(&candles, 0.05);
        assert_eq!(gaps.len(), 1);
        let gap = gaps[0];
        assert_eq!(gap.direction, Direction::Short);
        assert_eq!((gap.top, gap.bottom), (100.0, 98.0));
        assert!((gap.fill_percent() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn fill_state_never_regresses() {
        let mut state = FillState::Unfilled;
        state.advance(40.0, 3, 30);
        state.advance(20.0, 4, 40);
        assert_eq!(state.percent(), 40.0);
        state.advance(100.0, 5, 50);
        state.advance(10.0, 6, 60);
        assert_eq!(state, FillState::Filled { index: 5, time: 50 });
    }
}

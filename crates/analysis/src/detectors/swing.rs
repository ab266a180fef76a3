use serde::{Deserialize, Serialize};

use common::{Candle, SwingKind};

/// A local price extremum (pivot).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    /// Index of the pivot candle in the analysed slice.
    pub index: usize,
    pub time: i64,
    pub price: f64,
    pub kind: SwingKind,
}

/// Find pivots with `left` candles before and `right` candles after.
///
/// A HIGH pivot's high must strictly exceed every other high in `[i-left, i+right]`;
/// LOW pivots use the strict minimum of lows. Ties never qualify. Returns an empty
/// vector when the series is shorter than `left + right + 1`.
pub fn detect_swings(candles: &[Candle], left: usize, right: usize) -> Vec<SwingPoint> {
    if candles.len() < left + right + 1 {
        return Vec::new();
    }

    let mut swings = Vec::new();
    for i in left..candles.len() - right {
        let pivot = &candles[i];
        let mut window = i - left..=i + right;

        if window.clone().all(|j| j == i || candles[j].high < pivot.high) {
            swings.push(SwingPoint {
                index: i,
                time: pivot.time,
                price: pivot.high,
                kind: SwingKind::High,
            });
        }
        if window.all(|j| j == i || candles[j].low > pivot.low) {
            swings.push(SwingPoint {
                index: i,
                time: pivot.time,
                price: pivot.low,
                kind: SwingKind::Low,
            });
        }
    }
    swings
}

/// The last `n` swings of one kind, oldest first.
pub fn recent_swings(swings: &[SwingPoint], kind: SwingKind, n: usize) -> Vec<SwingPoint> {
    let mut picked: Vec<SwingPoint> = swings
        .iter()
        .rev()
        .filter(|s| s.kind == kind)
        .take(n)
        .copied()
        .collect();
    picked.reverse();
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(highs: &[f64]) -> Vec<Candle> {
        highs
            .iter()
            .enumerate()
            .map(|(i, &h)| Candle::new(i as i64 * 60_000, h - 0.5, h, h - 1.0, h - 0.5, 1.0))
            .collect()
    }

    #[test]
    fn flags_single_peak() {
        let candles = bars(&[10.0, 12.0, 15.0, 11.0, 9.0]);
        let swings = detect_swings(&candles, 1, 1);
        let highs: Vec<_> = swings.iter().filter(|s| s.kind == SwingKind::High).collect();
        assert_eq!(highs.len(), 1);
        assert_eq!(highs[0].index, 2);
        assert_eq!(highs[0].price, 15.0);
    }

    #[test]
    fn ties_are_not_pivots() {
        let candles = bars(&[10.0, 15.0, 15.0, 11.0, 9.0]);
        let swings = detect_swings(&candles, 1, 1);
        assert!(swings.iter().all(|s| s.kind != SwingKind::High));
    }

    #[test]
    fn finds_trough() {
        let candles = bars(&[20.0, 18.0, 14.0, 17.0, 19.0]);
        let swings = detect_swings(&candles, 2, 2);
        assert_eq!(swings.len(), 1);
        assert_eq!(swings[0].kind, SwingKind::Low);
        assert_eq!(swings[0].index, 2);
        assert_eq!(swings[0].price, 13.0);
    }

    #[test]
    fn short_series_yields_nothing() {
        let candles = bars(&[10.0, 12.0, 11.0, 9.0]);
        assert!(detect_swings(&candles, 2, 2).is_empty());
    }

    #[test]
    fn recent_swings_keeps_chronological_order() {
        let candles = bars(&[1.0, 5.0, 1.0, 6.0, 1.0, 7.0, 1.0, 8.0, 1.0]);
        let swings = detect_swings(&candles, 1, 1);
        let last_two = recent_swings(&swings, SwingKind::High, 2);
        assert_eq!(last_two.iter().map(|s| s.price).collect::<Vec<_>>(), vec![7.0, 8.0]);
    }
}

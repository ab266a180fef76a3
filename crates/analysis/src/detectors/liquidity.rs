use serde::{Deserialize, Serialize};

use common::{Candle, Direction, SwingKind, Timeframe};

use super::swing::SwingPoint;

const BASE_STRENGTH: f64 = 30.0;
const STRENGTH_PER_TEST: f64 = 15.0;

/// One-way liquidity lifecycle: `Active` → `Swept`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelStatus {
    Active,
    Swept { index: usize, time: i64 },
}

impl LevelStatus {
    pub fn is_swept(&self) -> bool {
        matches!(self, LevelStatus::Swept { .. })
    }

    /// Transition to `Swept`; false if already swept.
    pub fn sweep(&mut self, index: usize, time: i64) -> bool {
        if self.is_swept() {
            return false;
        }
        *self = LevelStatus::Swept { index, time };
        true
    }
}

/// A swing treated as a pool of resting orders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityLevel {
    pub price: f64,
    pub time: i64,
    /// Swing index in the series the level was built from.
    pub index: usize,
    pub kind: SwingKind,
    pub status: LevelStatus,
    /// 30 + 15 per later test of the level, capped at 100.
    pub strength: f64,
    pub timeframe: Timeframe,
}

impl LiquidityLevel {
    pub fn is_swept(&self) -> bool {
        self.status.is_swept()
    }

    pub fn sweep_index(&self) -> Option<usize> {
        match self.status {
            LevelStatus::Swept { index, .. } => Some(index),
            LevelStatus::Active => None,
        }
    }

    pub fn sweep_time(&self) -> Option<i64> {
        match self.status {
            LevelStatus::Swept { time, .. } => Some(time),
            LevelStatus::Active => None,
        }
    }

    /// Trade direction a sweep of this level favours: sell-side (LOW) sweeps
    /// favour longs, buy-side (HIGH) sweeps favour shorts.
    pub fn sweep_bias(&self) -> Direction {
        match self.kind {
            SwingKind::Low => Direction::Long,
            SwingKind::High => Direction::Short,
        }
    }
}

/// Turn swings into liquidity levels, scoring tests and recording the first sweep.
///
/// `tolerance` is the half-width (fraction of price) of the band counted as a test.
pub fn build_levels(
    candles: &[Candle],
    swings: &[SwingPoint],
    timeframe: Timeframe,
    tolerance: f64,
) -> Vec<LiquidityLevel> {
    swings
        .iter()
        .map(|swing| {
            let band_low = swing.price * (1.0 - tolerance);
            let band_high = swing.price * (1.0 + tolerance);
            let later = move || candles.iter().enumerate().skip(swing.index + 1);

            let tests = later()
                .filter(|(_, c)| {
                    let touch = match swing.kind {
                        SwingKind::High => c.high,
                        SwingKind::Low => c.low,
                    };
                    touch >= band_low && touch <= band_high
                })
                .count();

            let mut status = LevelStatus::Active;
            if let Some((k, c)) = later().find(|(_, c)| match swing.kind {
                SwingKind::High => c.high > swing.price,
                SwingKind::Low => c.low < swing.price,
            }) {
                status.sweep(k, c.time);
            }

            LiquidityLevel {
                price: swing.price,
                time: swing.time,
                index: swing.index,
                kind: swing.kind,
                status,
                strength: (BASE_STRENGTH + STRENGTH_PER_TEST * tests as f64).min(100.0),
                timeframe,
            }
        })
        .collect()
}

/// Same-side levels from two timeframes sitting within a tolerance of each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityConfluence {
    pub higher: LiquidityLevel,
    pub lower: LiquidityLevel,
    pub price_diff_pct: f64,
    pub score: f64,
}

/// Pair levels of the same kind whose prices differ by less than `tolerance_pct` percent.
/// Sorted by descending score.
pub fn find_confluence(
    higher: &[LiquidityLevel],
    lower: &[LiquidityLevel],
    tolerance_pct: f64,
) -> Vec<LiquidityConfluence> {
    if tolerance_pct <= 0.0 {
        return Vec::new();
    }
    let mut pairs = Vec::new();
    for h in higher {
        if h.price <= 0.0 {
            continue;
        }
        for l in lower.iter().filter(|l| l.kind == h.kind) {
            let diff_pct = (h.price - l.price).abs() / h.price * 100.0;
            if diff_pct >= tolerance_pct {
                continue;
            }
            let proximity = 20.0 * (1.0 - diff_pct / tolerance_pct);
            let activity = if !h.is_swept() && !l.is_swept() { 1.2 } else { 0.8 };
            let score = ((0.6 * h.strength + 0.4 * l.strength + proximity) * activity).min(100.0);
            pairs.push(LiquidityConfluence {
                higher: *h,
                lower: *l,
                price_diff_pct: diff_pct,
                score,
            });
        }
    }
    pairs.sort_by(|a, b| b.score.total_cmp(&a.score));
    pairs
}

/// An active level ranked by how strongly it should draw price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityMagnet {
    pub level: LiquidityLevel,
    pub distance_pct: f64,
    pub score: f64,
}

/// Rank active levels by proximity, timeframe weight and strength.
pub fn rank_magnets(levels: &[LiquidityLevel], current_price: f64) -> Vec<LiquidityMagnet> {
    let mut magnets: Vec<LiquidityMagnet> = levels
        .iter()
        .filter(|l| !l.is_swept())
        .map(|level| {
            let (distance_pct, proximity) = if current_price > 0.0 {
                let d = (level.price - current_price).abs() / current_price * 100.0;
                (d, 100.0 / (1.0 + d))
            } else {
                (0.0, 0.0)
            };
            let score = 0.4 * proximity
                + 0.3 * 100.0 * level.timeframe.magnet_weight()
                + 0.3 * level.strength;
            LiquidityMagnet {
                level: *level,
                distance_pct,
                score: score.clamp(0.0, 100.0),
            }
        })
        .collect();
    magnets.sort_by(|a, b| b.score.total_cmp(&a.score));
    magnets
}

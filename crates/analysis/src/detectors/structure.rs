use serde::{Deserialize, Serialize};

use common::{Candle, Direction, SwingKind};

use super::swing::SwingPoint;

/// Classification of a swing break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StructureKind {
    /// Break in the direction of the tracked trend.
    Bos,
    /// Break against the tracked trend; flips it.
    Choch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
}

/// A swing-break event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructurePoint {
    /// Index of the candle that broke the level.
    pub index: usize,
    pub time: i64,
    /// Price of the broken swing.
    pub price: f64,
    pub kind: StructureKind,
    /// `Long` for a break of a swing high, `Short` for a swing low.
    pub direction: Direction,
    /// The breaking candle closed beyond the level, not just wicked through it.
    pub confirmed: bool,
    pub swing_index: usize,
}

impl StructurePoint {
    /// Market structure shift: a CHoCH confirmed by the close.
    pub fn is_mss(&self) -> bool {
        self.kind == StructureKind::Choch && self.confirmed
    }
}

/// Walk the candles and log every break of the most recent unbroken swing.
///
/// The trend is seeded from the first swing (a LOW seeds `Up`). The reference
/// swing on each side is the latest swing of that kind strictly before the
/// current candle and newer than the last one broken.
pub fn analyze_structure(candles: &[Candle], swings: &[SwingPoint]) -> Vec<StructurePoint> {
    let Some(first) = swings.first() else {
        return Vec::new();
    };
    let mut trend = match first.kind {
        SwingKind::Low => Trend::Up,
        SwingKind::High => Trend::Down,
    };

    let highs: Vec<&SwingPoint> = swings.iter().filter(|s| s.kind == SwingKind::High).collect();
    let lows: Vec<&SwingPoint> = swings.iter().filter(|s| s.kind == SwingKind::Low).collect();
    let mut high_cursor = 0;
    let mut low_cursor = 0;
    let mut broken_high: Option<usize> = None;
    let mut broken_low: Option<usize> = None;
    let mut events = Vec::new();

    for (i, candle) in candles.iter().enumerate() {
        while high_cursor < highs.len() && highs[high_cursor].index < i {
            high_cursor += 1;
        }
        while low_cursor < lows.len() && lows[low_cursor].index < i {
            low_cursor += 1;
        }

        if let Some(level) = reference(&highs, high_cursor, broken_high) {
            if candle.high > level.price {
                let kind = match trend {
                    Trend::Up => StructureKind::Bos,
                    Trend::Down => StructureKind::Choch,
                };
                trend = Trend::Up;
                broken_high = Some(level.index);
                events.push(StructurePoint {
                    index: i,
                    time: candle.time,
                    price: level.price,
                    kind,
                    direction: Direction::Long,
                    confirmed: candle.close > level.price,
                    swing_index: level.index,
                });
            }
        }

        if let Some(level) = reference(&lows, low_cursor, broken_low) {
            if candle.low < level.price {
                let kind = match trend {
                    Trend::Down => StructureKind::Bos,
                    Trend::Up => StructureKind::Choch,
                };
                trend = Trend::Down;
                broken_low = Some(level.index);
                events.push(StructurePoint {
                    index: i,
                    time: candle.time,
                    price: level.price,
                    kind,
                    direction: Direction::Short,
                    confirmed: candle.close < level.price,
                    swing_index: level.index,
                });
            }
        }
    }
    events
}

fn reference<'a>(
    swings: &[&'a SwingPoint],
    cursor: usize,
    broken: Option<usize>,
) -> Option<&'a SwingPoint> {
    let latest = *swings.get(cursor.checked_sub(1)?)?;
    match broken {
        Some(b) if latest.index <= b => None,
        _ => Some(latest),
    }
}

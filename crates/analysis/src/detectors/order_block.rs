use serde::{Deserialize, Serialize};

use common::{Candle, Direction};

use super::structure::StructurePoint;

/// How far back from a break the origin candle may sit.
pub const ORDER_BLOCK_LOOKBACK: usize = 20;
/// Blocks at or below this strength are dropped.
pub const MIN_ORDER_BLOCK_STRENGTH: f64 = 20.0;

/// One-way zone lifecycle: `Active` → `Mitigated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MitigationState {
    Active,
    Mitigated { index: usize, time: i64 },
}

impl MitigationState {
    pub fn is_mitigated(&self) -> bool {
        matches!(self, MitigationState::Mitigated { .. })
    }

    /// Transition to `Mitigated`. A no-op returning false once already mitigated.
    pub fn mitigate(&mut self, index: usize, time: i64) -> bool {
        if self.is_mitigated() {
            return false;
        }
        *self = MitigationState::Mitigated { index, time };
        true
    }
}

/// Supply/demand origin zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBlock {
    pub top: f64,
    pub bottom: f64,
    /// Index of the origin candle.
    pub index: usize,
    pub time: i64,
    pub direction: Direction,
    pub volume: f64,
    pub strength: f64,
    pub state: MitigationState,
}

impl OrderBlock {
    pub fn is_mitigated(&self) -> bool {
        self.state.is_mitigated()
    }

    pub fn midpoint(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    /// The edge price returns to first: top for demand, bottom for supply.
    pub fn entry_edge(&self) -> f64 {
        match self.direction {
            Direction::Long => self.top,
            Direction::Short => self.bottom,
        }
    }

    /// Percent distance from `price` to the zone, 0 inside it.
    pub fn distance_pct(&self, price: f64) -> f64 {
        distance_to_range_pct(price, self.bottom, self.top)
    }
}

/// Percent distance from `price` to `[bottom, top]`; 0 inside, 0 for non-positive prices.
pub(crate) fn distance_to_range_pct(price: f64, bottom: f64, top: f64) -> f64 {
    if price <= 0.0 {
        return 0.0;
    }
    let gap = if price > top {
        price - top
    } else if price < bottom {
        bottom - price
    } else {
        0.0
    };
    gap / price * 100.0
}

/// Derive order blocks from structure breaks.
///
/// A bullish break looks back for the nearest bearish candle and takes its
/// open-to-low range; a bearish break takes the nearest bullish candle's
/// open-to-high range.
pub fn detect_order_blocks(candles: &[Candle], events: &[StructurePoint]) -> Vec<OrderBlock> {
    if candles.is_empty() {
        return Vec::new();
    }
    let avg_volume = candles.iter().map(|c| c.volume).sum::<f64>() / candles.len() as f64;

    let mut blocks: Vec<OrderBlock> = Vec::new();
    for event in events {
        let t = event.index.min(candles.len() - 1);
        let start = t.saturating_sub(ORDER_BLOCK_LOOKBACK);
        let origin = (start..t).rev().find(|&j| match event.direction {
            Direction::Long => candles[j].is_bearish(),
            Direction::Short => candles[j].is_bullish(),
        });
        let Some(j) = origin else {
            continue;
        };
        if blocks
            .iter()
            .any(|b| b.index == j && b.direction == event.direction)
        {
            continue;
        }

        let c = &candles[j];
        let (top, bottom) = match event.direction {
            Direction::Long => (c.open, c.low),
            Direction::Short => (c.high, c.open),
        };
        let strength = block_strength(c, &candles[t], event.direction, avg_volume);
        if strength <= MIN_ORDER_BLOCK_STRENGTH {
            continue;
        }

        let mut block = OrderBlock {
            top,
            bottom,
            index: j,
            time: c.time,
            direction: event.direction,
            volume: c.volume,
            strength,
            state: MitigationState::Active,
        };
        track_mitigation(candles, &mut block);
        blocks.push(block);
    }
    blocks
}

fn block_strength(origin: &Candle, breaker: &Candle, direction: Direction, avg_volume: f64) -> f64 {
    let volume_score = if avg_volume > 0.0 {
        (origin.volume / avg_volume * 50.0).min(100.0) * 0.5
    } else {
        0.0
    };
    let far_edge = match direction {
        Direction::Long => origin.low,
        Direction::Short => origin.high,
    };
    let move_pct = if far_edge > 0.0 {
        (breaker.close - far_edge).abs() / far_edge * 100.0
    } else {
        0.0
    };
    let move_score = (move_pct * 20.0).min(50.0);
    (volume_score + move_score).clamp(0.0, 100.0)
}

fn track_mitigation(candles: &[Candle], block: &mut OrderBlock) {
    for (k, c) in candles.iter().enumerate().skip(block.index + 1) {
        let touched = match block.direction {
            Direction::Long => c.low <= block.bottom,
            Direction::Short => c.high >= block.top,
        };
        if touched {
            block.state.mitigate(k, c.time);
            return;
        }
    }
}

use serde::{Deserialize, Serialize};

use common::{Direction, SwingKind};

use super::swing::{recent_swings, SwingPoint};

const SWINGS_PER_SIDE: usize = 3;
const DISCOUNT_FIB: f64 = 0.382;
const EQUILIBRIUM_FIB: f64 = 0.5;
const PREMIUM_FIB: f64 = 0.618;

/// Where a price sits inside the dealing range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PdZone {
    Discount,
    Equilibrium,
    Premium,
}

/// Fibonacci premium/discount band over the recent swing range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdArray {
    pub high: f64,
    pub low: f64,
    pub discount: f64,
    pub equilibrium: f64,
    pub premium: f64,
    /// `Long` when price is at or below equilibrium.
    pub bias: Direction,
    /// Range size relative to price, 0–100.
    pub strength: f64,
}

impl PdArray {
    pub fn zone(&self, price: f64) -> PdZone {
        if price <= self.discount {
            PdZone::Discount
        } else if price >= self.premium {
            PdZone::Premium
        } else {
            PdZone::Equilibrium
        }
    }
}

/// Build the band from the last three swing highs and lows.
/// Returns `None` if either side has no swings.
pub fn premium_discount(swings: &[SwingPoint], current_price: f64) -> Option<PdArray> {
    let highs = recent_swings(swings, SwingKind::High, SWINGS_PER_SIDE);
    let lows = recent_swings(swings, SwingKind::Low, SWINGS_PER_SIDE);
    if highs.is_empty() || lows.is_empty() {
        return None;
    }

    let high = highs.iter().map(|s| s.price).fold(f64::MIN, f64::max);
    let low = lows.iter().map(|s| s.price).fold(f64::MAX, f64::min);
    let range = high - low;
    let equilibrium = low + EQUILIBRIUM_FIB * range;
    let strength = if current_price > 0.0 {
        (range.abs() / current_price * 1000.0).min(100.0)
    } else {
        0.0
    };

    Some(PdArray {
        high,
        low,
        discount: low + DISCOUNT_FIB * range,
        equilibrium,
        premium: low + PREMIUM_FIB * range,
        bias: if current_price <= equilibrium {
            Direction::Long
        } else {
            Direction::Short
        },
        strength,
    })
}

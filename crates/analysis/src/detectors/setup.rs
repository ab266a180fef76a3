use serde::{Deserialize, Serialize};

use common::{AnalysisConfig, Candle, Direction, SwingKind};

use super::fvg::gap_between;
use super::liquidity::LiquidityLevel;

/// Candles after the sweep searched for a displacement.
pub const DISPLACEMENT_WINDOW: usize = 5;
/// Stop offset beyond the swept level, as a fraction of price.
pub const STOP_BUFFER: f64 = 0.002;

/// Liquidity sweep followed by a displacement candle that leaves an imbalance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepFvgSetup {
    pub level: LiquidityLevel,
    pub sweep_index: usize,
    /// Extreme wick of the sweeping candle.
    pub sweep_wick: f64,
    pub displacement_index: usize,
    /// Displacement body as a fraction of its open.
    pub displacement_size: f64,
    pub gap_top: f64,
    pub gap_bottom: f64,
    pub entry: f64,
    pub stop: f64,
    pub direction: Direction,
    pub quality: f64,
}

/// Combine swept levels with the displacement and gap that follow them.
/// Sorted by descending quality.
pub fn detect_setups(
    candles: &[Candle],
    levels: &[LiquidityLevel],
    cfg: &AnalysisConfig,
) -> Vec<SweepFvgSetup> {
    let mut setups: Vec<SweepFvgSetup> = levels
        .iter()
        .filter_map(|level| setup_for_level(candles, level, cfg))
        .collect();
    setups.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    setups
}

fn setup_for_level(
    candles: &[Candle],
    level: &LiquidityLevel,
    cfg: &AnalysisConfig,
) -> Option<SweepFvgSetup> {
    let sweep_index = level.sweep_index()?;
    let sweep_candle = candles.get(sweep_index)?;
    let direction = level.sweep_bias();

    let last = (sweep_index + DISPLACEMENT_WINDOW).min(candles.len().saturating_sub(2));
    for d in sweep_index + 1..=last {
        let candle = &candles[d];
        if candle.open <= 0.0 || !candle.moved_with(direction) {
            continue;
        }
        let size = candle.body() / candle.open;
        if size <= cfg.min_displacement {
            continue;
        }
        let Some((gap_dir, top, bottom)) = gap_between(&candles[d - 1], &candles[d + 1], cfg.min_gap_pct)
        else {
            continue;
        };
        if gap_dir != direction {
            continue;
        }

        let entry = (top + bottom) / 2.0;
        let (sweep_wick, stop) = match level.kind {
            SwingKind::High => (sweep_candle.high, level.price * (1.0 + STOP_BUFFER)),
            SwingKind::Low => (sweep_candle.low, level.price * (1.0 - STOP_BUFFER)),
        };
        let gap_pct = if entry > 0.0 { (top - bottom) / entry * 100.0 } else { 0.0 };
        let quality = 0.4 * level.strength
            + (size * 3000.0).min(30.0)
            + (gap_pct * 40.0).min(20.0)
            + if level.is_swept() { 10.0 } else { 0.0 };

        return Some(SweepFvgSetup {
            level: *level,
            sweep_index,
            sweep_wick,
            displacement_index: d,
            displacement_size: size,
            gap_top: top,
            gap_bottom: bottom,
            entry,
            stop,
            direction,
            quality: quality.clamp(0.0, 100.0),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::liquidity::LevelStatus;
    use common::Timeframe;

    fn candle(i: usize, o: f64, h: f64, l: f64, c: f64) -> Candle {
        Candle::new(i as i64 * 60_000, o, h, l, c, 1.0)
    }

    fn sell_side_sweep() -> Vec<Candle> {
        vec![
            candle(0, 101.0, 101.5, 100.5, 101.0),
            candle(1, 101.0, 101.2, 100.4, 100.6),
            candle(2, 100.6, 100.8, 100.0, 100.5),
            candle(3, 100.5, 101.0, 100.3, 100.9),
            candle(4, 100.9, 101.1, 100.4, 100.5),
            candle(5, 100.5, 100.7, 99.5, 100.3),
            candle(6, 100.3, 101.8, 100.2, 101.7),
            candle(7, 101.7, 102.5, 101.2, 102.3),
        ]
    }

    fn low_level(status: LevelStatus) -> LiquidityLevel {
        LiquidityLevel {
            price: 100.0,
            time: 120_000,
            index: 2,
            kind: SwingKind::Low,
            status,
            strength: 45.0,
            timeframe: Timeframe::M15,
        }
    }

    #[test]
    fn sweep_displacement_and_gap_form_a_long_setup() {
        let level = low_level(LevelStatus::Swept { index: 5, time: 300_000 });
        let setups = detect_setups(&sell_side_sweep(), &[level], &AnalysisConfig::default());
        assert_eq!(setups.len(), 1);
        let s = setups[0];
        assert_eq!(s.direction, Direction::Long);
        assert_eq!(s.displacement_index, 6);
        assert_eq!((s.gap_top, s.gap_bottom), (101.2, 100.7));
        assert!((s.entry - 100.95).abs() < 1e-9);
        assert_eq!(s.sweep_wick, 99.5);
        assert!((s.stop - 100.0 * 0.998).abs() < 1e-9);
        assert!((s.quality - 77.81).abs() < 0.01, "quality {}", s.quality);
    }

    #[test]
    fn active_levels_produce_nothing() {
        let level = low_level(LevelStatus::Active);
        assert!(detect_setups(&sell_side_sweep(), &[level], &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn displacement_against_the_sweep_is_ignored() {
        let mut candles = sell_side_sweep();
        // turn the displacement bearish and remove the gap
        candles[6] = candle(6, 101.7, 101.8, 100.2, 100.3);
        candles[7] = candle(7, 100.3, 100.6, 99.9, 100.1);
        let level = low_level(LevelStatus::Swept { index: 5, time: 300_000 });
        assert!(detect_setups(&candles, &[level], &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn setups_sorted_by_quality() {
        let strong = LiquidityLevel {
            strength: 90.0,
            ..low_level(LevelStatus::Swept { index: 5, time: 300_000 })
        };
        let weak = low_level(LevelStatus::Swept { index: 5, time: 300_000 });
        let setups = detect_setups(&sell_side_sweep(), &[weak, strong], &AnalysisConfig::default());
        assert_eq!(setups.len(), 2);
        assert!(setups[0].quality > setups[1].quality);
        assert_eq!(setups[0].level.strength, 90.0);
    }

    #[test]
    fn stop_is_anchored_to_the_level_not_the_wick() {
        let mut candles = sell_side_sweep();
        candles[5] = candle(5, 100.5, 100.7, 98.0, 100.3);
        let level = low_level(LevelStatus::Swept { index: 5, time: 300_000 });
        let s = detect_setups(&candles, &[level], &AnalysisConfig::default())[0];
        assert_eq!(s.sweep_wick, 98.0);
        assert!((s.stop - 99.8).abs() < 1e-9);
    }

    #[test]
    fn buy_side_sweep_stops_above_the_level() {
        // mirror the sell-side scenario around 100
        let candles: Vec<Candle> = sell_side_sweep()
            .iter()
            .enumerate()
            .map(|(i, c)| candle(i, 200.0 - c.open, 200.0 - c.low, 200.0 - c.high, 200.0 - c.close))
            .collect();
        let level = LiquidityLevel {
            kind: SwingKind::High,
            ..low_level(LevelStatus::Swept { index: 5, time: 300_000 })
        };
        let setups = detect_setups(&candles, &[level], &AnalysisConfig::default());
        assert_eq!(setups.len(), 1);
        let s = setups[0];
        assert_eq!(s.direction, Direction::Short);
        assert!((s.sweep_wick - 100.5).abs() < 1e-9);
        assert!((s.stop - 100.2).abs() < 1e-9);
        assert!(s.stop > s.entry);
    }
}

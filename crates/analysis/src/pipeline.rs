use serde::Serialize;
use tracing::debug;

use common::{AnalysisConfig, Candle, Timeframe};

use crate::detectors::{
    analyze_structure, build_levels, detect_fvgs, detect_order_blocks, detect_setups,
    detect_swings, find_confluence, premium_discount, rank_magnets, FairValueGap,
    LiquidityConfluence, LiquidityLevel, LiquidityMagnet, OrderBlock, PdArray, StructurePoint,
    SweepFvgSetup, SwingPoint,
};

/// Levels from two timeframes closer than this (percent) count as confluent.
pub const CONFLUENCE_TOLERANCE_PCT: f64 = 0.2;

/// Every artifact of one analysis pass, computed in dependency order.
///
/// Nothing here is patched after construction; a new bar means a new pass.
#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    pub timeframe: Timeframe,
    pub last_price: f64,
    pub last_time: i64,
    pub swings: Vec<SwingPoint>,
    pub structure: Vec<StructurePoint>,
    pub order_blocks: Vec<OrderBlock>,
    pub fair_value_gaps: Vec<FairValueGap>,
    pub pd_array: Option<PdArray>,
    pub levels: Vec<LiquidityLevel>,
    pub higher_levels: Vec<LiquidityLevel>,
    pub confluences: Vec<LiquidityConfluence>,
    pub magnets: Vec<LiquidityMagnet>,
    pub setups: Vec<SweepFvgSetup>,
}

impl MarketAnalysis {
    pub fn compute(candles: &[Candle], cfg: &AnalysisConfig, timeframe: Timeframe) -> Self {
        Self::compute_with_higher(candles, cfg, timeframe, None)
    }

    /// Run the full pipeline, optionally pulling liquidity from a higher timeframe series.
    pub fn compute_with_higher(
        candles: &[Candle],
        cfg: &AnalysisConfig,
        timeframe: Timeframe,
        higher: Option<(&[Candle], Timeframe)>,
    ) -> Self {
        let (last_price, last_time) = candles
            .last()
            .map(|c| (c.close, c.time))
            .unwrap_or((0.0, 0));

        let swings = detect_swings(candles, cfg.swing_left, cfg.swing_right);
        let structure = analyze_structure(candles, &swings);
        let order_blocks = detect_order_blocks(candles, &structure);
        let fair_value_gaps = detect_fvgs(candles, cfg.min_gap_pct);
        let pd_array = premium_discount(&swings, last_price);
        let levels = build_levels(candles, &swings, timeframe, cfg.sweep_tolerance);

        let higher_levels = match higher {
            Some((htf_candles, htf)) => {
                let htf_swings = detect_swings(htf_candles, cfg.swing_left, cfg.swing_right);
                build_levels(htf_candles, &htf_swings, htf, cfg.sweep_tolerance)
            }
            None => Vec::new(),
        };
        let confluences = find_confluence(&higher_levels, &levels, CONFLUENCE_TOLERANCE_PCT);

        let mut all_levels = levels.clone();
        all_levels.extend_from_slice(&higher_levels);
        let magnets = rank_magnets(&all_levels, last_price);
        let setups = detect_setups(candles, &levels, cfg);

        debug!(
            candles = candles.len(),
            swings = swings.len(),
            structure = structure.len(),
            order_blocks = order_blocks.len(),
            fvgs = fair_value_gaps.len(),
            levels = levels.len(),
            higher_levels = higher_levels.len(),
            setups = setups.len(),
            "Analysis pass complete"
        );

        Self {
            timeframe,
            last_price,
            last_time,
            swings,
            structure,
            order_blocks,
            fair_value_gaps,
            pd_array,
            levels,
            higher_levels,
            confluences,
            magnets,
            setups,
        }
    }

    /// Highest-quality setup, the one normally acted upon.
    pub fn best_setup(&self) -> Option<&SweepFvgSetup> {
        self.setups.first()
    }
}

pub mod fvg;
pub mod liquidity;
pub mod order_block;
pub mod pd_array;
pub mod setup;
pub mod structure;
pub mod swing;

pub use fvg::{detect_fvgs, gap_between, FairValueGap, FillState};
pub use liquidity::{
    build_levels, find_confluence, rank_magnets, LevelStatus, LiquidityConfluence, LiquidityLevel,
    LiquidityMagnet,
};
pub use order_block::{detect_order_blocks, MitigationState, OrderBlock};
pub use pd_array::{premium_discount, PdArray, PdZone};
pub use setup::{detect_setups, SweepFvgSetup};
pub use structure::{analyze_structure, StructureKind, StructurePoint, Trend};
pub use swing::{detect_swings, recent_swings, SwingPoint};

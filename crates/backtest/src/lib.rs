//! Per-bar trade decisions and the walk-forward simulator built on them.

pub mod assess;
pub mod journal;
pub mod metrics;
pub mod outcome;
pub mod simulator;

pub use assess::{assess, Assessment, BarEvaluator, CouncilEvaluator, Decision};
pub use journal::MemoryJournal;
pub use metrics::{profit_factor, BacktestMetrics, SessionBreakdown, SessionStats, PROFIT_FACTOR_SENTINEL};
pub use outcome::resolve_outcome;
pub use simulator::{open_trade, simulate_trade, BacktestReport, Backtester, SkipCounts, MIN_CANDLES};

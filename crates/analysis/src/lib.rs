//! Pattern detectors over a candle slice and the pipeline that runs them.
//!
//! Every detector takes immutable input and returns fresh output. Too little
//! data yields an empty result (or `None`), never an error.

pub mod detectors;
pub mod pipeline;
pub mod resample;

pub use detectors::*;
pub use pipeline::{MarketAnalysis, CONFLUENCE_TOLERANCE_PCT};
pub use resample::resample;

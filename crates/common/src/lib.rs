pub mod config;
pub mod error;
pub mod feed;
pub mod session;
pub mod types;

pub use config::{AnalysisConfig, BacktestConfig, Config};
pub use error::{ensure_len, Error, Result};
pub use feed::{CandleFeed, TradeJournal};
pub use session::{FixedClock, KillzoneClock, Session, SessionClock, SessionStatus};
pub use types::*;

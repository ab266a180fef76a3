use async_trait::async_trait;

use crate::{Candle, Result, Ticker, Timeframe, Trade};

/// Abstraction over the market data source.
///
/// Live WebSocket streams, REST history and file replays all implement this.
/// The analysis pipeline only ever sees the returned candle slice.
#[async_trait]
pub trait CandleFeed: Send + Sync {
    /// Most recent `limit` candles, oldest first.
    async fn candles(&self, symbol: &str, timeframe: Timeframe, limit: usize) -> Result<Vec<Candle>>;

    /// Latest ticker snapshot for a symbol.
    async fn ticker(&self, symbol: &str) -> Result<Ticker>;
}

/// Sink for finished trade records (display, storage or an execution venue).
#[async_trait]
pub trait TradeJournal: Send + Sync {
    async fn record(&self, trade: &Trade) -> Result<()>;

    /// Everything recorded so far, in insertion order.
    async fn trades(&self) -> Result<Vec<Trade>>;
}

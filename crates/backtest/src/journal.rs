use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use common::{Error, Result, Trade, TradeJournal};

/// In-memory trade journal. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryJournal {
    trades: Arc<RwLock<Vec<Trade>>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.trades.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.trades.read().await.is_empty()
    }
}

#[async_trait]
impl TradeJournal for MemoryJournal {
    async fn record(&self, trade: &Trade) -> Result<()> {
        let mut trades = self.trades.write().await;
        if trades.iter().any(|t| t.id == trade.id) {
            return Err(Error::Other(format!("trade {} already journaled", trade.id)));
        }
        debug!(id = %trade.id, direction = %trade.direction, "Trade journaled");
        trades.push(trade.clone());
        Ok(())
    }

    async fn trades(&self) -> Result<Vec<Trade>> {
        Ok(self.trades.read().await.clone())
    }
}

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use common::{Candle, CandleFeed, Error, Result, Ticker, Timeframe, Trade, TradeJournal};

const DAY_MS: i64 = 86_400_000;

/// Candle history replayed from a JSON array on disk.
pub struct FileFeed {
    candles: Vec<Candle>,
}

impl FileFeed {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).await?;
        let mut candles: Vec<Candle> = serde_json::from_str(&raw)?;
        candles.sort_by_key(|c| c.time);
        debug!(path = %path.display(), candles = candles.len(), "Candle file loaded");
        Ok(Self { candles })
    }

    pub fn all(&self) -> &[Candle] {
        &self.candles
    }
}

#[async_trait]
impl CandleFeed for FileFeed {
    async fn candles(&self, _symbol: &str, _timeframe: Timeframe, limit: usize) -> Result<Vec<Candle>> {
        let start = self.candles.len().saturating_sub(limit);
        Ok(self.candles[start..].to_vec())
    }

    /// Ticker derived from the file: last close, change and volume over the trailing day.
    async fn ticker(&self, symbol: &str) -> Result<Ticker> {
        let last = self
            .candles
            .last()
            .ok_or_else(|| Error::Feed(format!("no candles for {symbol}")))?;
        let day: Vec<&Candle> = self
            .candles
            .iter()
            .filter(|c| c.time > last.time - DAY_MS)
            .collect();
        let open = day.first().map(|c| c.open).unwrap_or(last.open);
        let change_24h_pct = if open > 0.0 { (last.close - open) / open * 100.0 } else { 0.0 };

        Ok(Ticker {
            symbol: symbol.to_string(),
            last_price: last.close,
            change_24h_pct,
            volume_24h: day.iter().map(|c| c.volume).sum(),
            mark_price: last.close,
            funding_rate: 0.0,
        })
    }
}

/// Append-only JSON-lines trade journal.
pub struct FileJournal {
    path: PathBuf,
}

impl FileJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TradeJournal for FileJournal {
    async fn record(&self, trade: &Trade) -> Result<()> {
        let mut line = serde_json::to_string(trade)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn trades(&self) -> Result<Vec<Trade>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        raw.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(Error::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Direction, Grade, Session};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("quentrex-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn feed_serves_the_tail_and_a_daily_ticker() {
        let path = temp_path("candles.json");
        let json = r#"[
            {"start_time": 7200000, "open": 11, "high": 12, "low": 10, "close": 12, "volume": 5},
            {"t": 0, "open": 10, "high": 11, "low": 9, "close": 11, "volume": 2},
            {"time": 90000000, "open": 12, "high": 13, "low": 11, "close": 13}
        ]"#;
        fs::write(&path, json).await.unwrap();

        let feed = FileFeed::open(&path).await.unwrap();
        assert_eq!(feed.all()[0].time, 0);
        let tail = feed.candles("SOLUSDT", Timeframe::M15, 2).await.unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[1].close, 13.0);

        // only the candle at 7_200_000 and the last one are inside the trailing day
        let ticker = feed.ticker("SOLUSDT").await.unwrap();
        assert_eq!(ticker.last_price, 13.0);
        assert_eq!(ticker.volume_24h, 5.0);
        assert!((ticker.change_24h_pct - (13.0 - 11.0) / 11.0 * 100.0).abs() < 1e-9);

        fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn journal_round_trips_lines() {
        let path = temp_path("journal.jsonl");
        let _ = fs::remove_file(&path).await;
        let journal = FileJournal::new(&path);
        assert!(journal.trades().await.unwrap().is_empty());

        let trade = Trade {
            id: Trade::generate_id(),
            symbol: "SOLUSDT".into(),
            direction: Direction::Long,
            grade: Grade::A,
            consensus_score: 83.5,
            session: Session::NewYork,
            entry: 100.0,
            stop: 99.0,
            target1: 101.6,
            target2: 103.2,
            size: 3.0,
            entry_time: 0,
            exit: None,
        };
        journal.record(&trade).await.unwrap();
        journal.record(&trade).await.unwrap();
        let stored = journal.trades().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id, trade.id);

        fs::remove_file(&path).await.unwrap();
    }
}

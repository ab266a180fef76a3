use serde::{Deserialize, Serialize};

use crate::session::Session;

/// One OHLCV bar. `time` is the bar's start in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(alias = "start_time", alias = "t")]
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self { time, open, high, low, close, volume }
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// True when the candle closed in the given direction.
    pub fn moved_with(&self, direction: Direction) -> bool {
        match direction {
            Direction::Long => self.is_bullish(),
            Direction::Short => self.is_bearish(),
        }
    }
}

/// Trade direction. Also used as the bullish/bearish polarity of zones and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }

    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Which extreme a swing point (or liquidity level) sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwingKind {
    High,
    Low,
}

impl std::fmt::Display for SwingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwingKind::High => write!(f, "HIGH"),
            SwingKind::Low => write!(f, "LOW"),
        }
    }
}

/// Candle interval of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub fn minutes(self) -> u32 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::D1 => 1440,
        }
    }

    /// Magnet weight: longer intervals pull harder.
    pub fn magnet_weight(self) -> f64 {
        match self {
            Timeframe::M1 => 0.2,
            Timeframe::M5 => 0.4,
            Timeframe::M15 => 0.6,
            Timeframe::H1 => 0.8,
            Timeframe::H4 => 0.9,
            Timeframe::D1 => 1.0,
        }
    }

    /// The listed timeframe exactly `factor` bars of `self` long, if there is one.
    pub fn scaled(self, factor: usize) -> Option<Self> {
        let target = self.minutes() as usize * factor;
        [
            Timeframe::M1,
            Timeframe::M5,
            Timeframe::M15,
            Timeframe::H1,
            Timeframe::H4,
            Timeframe::D1,
        ]
        .into_iter()
        .find(|tf| tf.minutes() as usize == target)
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Timeframe {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" => Ok(Timeframe::M1),
            "5m" => Ok(Timeframe::M5),
            "15m" => Ok(Timeframe::M15),
            "1h" => Ok(Timeframe::H1),
            "4h" => Ok(Timeframe::H4),
            "1d" => Ok(Timeframe::D1),
            other => Err(crate::Error::Config(format!("unknown timeframe '{other}'"))),
        }
    }
}

/// Live ticker snapshot supplied by the market data feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub last_price: f64,
    pub change_24h_pct: f64,
    pub volume_24h: f64,
    pub mark_price: f64,
    pub funding_rate: f64,
}

/// Letter grade of a consensus score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    C,
    B,
    A,
    #[serde(rename = "A+")]
    APlus,
}

impl Grade {
    /// Step function with inclusive lower bounds at 65 / 80 / 90.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::APlus
        } else if score >= 80.0 {
            Grade::A
        } else if score >= 65.0 {
            Grade::B
        } else {
            Grade::C
        }
    }

    pub fn is_tradeable(self) -> bool {
        matches!(self, Grade::A | Grade::APlus)
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grade::APlus => write!(f, "A+"),
            Grade::A => write!(f, "A"),
            Grade::B => write!(f, "B"),
            Grade::C => write!(f, "C"),
        }
    }
}

/// How a trade was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeOutcome {
    Target2Hit,
    Target1Hit,
    StopHit,
}

impl std::fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeOutcome::Target2Hit => write!(f, "TP2"),
            TradeOutcome::Target1Hit => write!(f, "TP1"),
            TradeOutcome::StopHit => write!(f, "SL"),
        }
    }
}

/// Closing fields of a trade, written once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeExit {
    pub outcome: TradeOutcome,
    pub price: f64,
    pub time: i64,
    pub pnl: f64,
}

/// A taken or simulated position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub symbol: String,
    pub direction: Direction,
    pub grade: Grade,
    pub consensus_score: f64,
    pub session: Session,
    pub entry: f64,
    pub stop: f64,
    pub target1: f64,
    pub target2: f64,
    /// Position size in base units.
    pub size: f64,
    pub entry_time: i64,
    pub exit: Option<TradeExit>,
}

impl Trade {
    /// Random identifier for trades created outside a replay.
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn is_open(&self) -> bool {
        self.exit.is_none()
    }

    /// Resolve the trade. Returns the realized P&L, or `None` if it was already closed.
    pub fn close(&mut self, outcome: TradeOutcome, price: f64, time: i64) -> Option<f64> {
        if self.exit.is_some() {
            return None;
        }
        let pnl = self.size * (price - self.entry) * self.direction.sign();
        self.exit = Some(TradeExit {
            outcome,
            price,
            time,
            pnl,
        });
        Some(pnl)
    }

    /// Realized P&L; 0 while open.
    pub fn pnl(&self) -> f64 {
        self.exit.as_ref().map(|e| e.pnl).unwrap_or(0.0)
    }

    pub fn is_win(&self) -> bool {
        self.pnl() > 0.0
    }
}

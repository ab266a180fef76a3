use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

/// Named trading session. `Other` buckets anything outside the killzones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Session {
    Asia,
    London,
    NewYork,
    Other,
}

impl Session {
    pub const ALL: [Session; 4] = [Session::Asia, Session::London, Session::NewYork, Session::Other];

    /// The session carrying the most volume.
    pub fn is_peak_volume(self) -> bool {
        self == Session::NewYork
    }
}

impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Session::Asia => write!(f, "asia"),
            Session::London => write!(f, "london"),
            Session::NewYork => write!(f, "new_york"),
            Session::Other => write!(f, "other"),
        }
    }
}

/// Result of a session-window lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Active {
        session: Session,
        minutes_remaining: u32,
    },
    Closed,
}

impl SessionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Active { .. })
    }

    /// Session label for bookkeeping; `Other` when closed.
    pub fn session(&self) -> Session {
        match self {
            SessionStatus::Active { session, .. } => *session,
            SessionStatus::Closed => Session::Other,
        }
    }
}

/// Maps a timestamp to the session window it falls into.
pub trait SessionClock: Send + Sync {
    fn session_at(&self, time_ms: i64) -> SessionStatus;

    /// Calendar day a timestamp belongs to, used to scope per-session trade counts.
    fn trading_day(&self, time_ms: i64) -> i64 {
        time_ms.div_euclid(86_400_000)
    }
}

/// Myanmar time, UTC+06:30.
const MMT_OFFSET_SECS: i32 = 6 * 3600 + 30 * 60;

/// Killzone windows in minutes after MMT midnight, inclusive on both ends.
const KILLZONES: [(Session, u32, u32); 3] = [
    (Session::Asia, 6 * 60 + 30, 10 * 60),
    (Session::London, 13 * 60, 17 * 60),
    (Session::NewYork, 18 * 60 + 15, 22 * 60 + 5),
];

/// Fixed killzone table evaluated in Myanmar time.
#[derive(Debug, Clone, Copy, Default)]
pub struct KillzoneClock;

impl KillzoneClock {
    fn local(time_ms: i64) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(MMT_OFFSET_SECS)?;
        DateTime::from_timestamp_millis(time_ms).map(|dt| dt.with_timezone(&offset))
    }
}

impl SessionClock for KillzoneClock {
    fn session_at(&self, time_ms: i64) -> SessionStatus {
        let Some(local) = Self::local(time_ms) else {
            return SessionStatus::Closed;
        };
        let seconds = local.num_seconds_from_midnight();
        for (session, start, end) in KILLZONES {
            if seconds >= start * 60 && seconds <= end * 60 {
                return SessionStatus::Active {
                    session,
                    minutes_remaining: (end * 60 - seconds) / 60,
                };
            }
        }
        SessionStatus::Closed
    }

    fn trading_day(&self, time_ms: i64) -> i64 {
        (time_ms + MMT_OFFSET_SECS as i64 * 1000).div_euclid(86_400_000)
    }
}

/// A clock that reports one fixed status. Handy for replaying data with no session filter.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub SessionStatus);

impl SessionClock for FixedClock {
    fn session_at(&self, _time_ms: i64) -> SessionStatus {
        self.0
    }
}

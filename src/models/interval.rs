//! Work interval model and its session state machine.
//!
//! This module defines the [`WorkInterval`] struct and the [`IntervalState`]
//! enum representing one contiguous (possibly paused) work session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Milliseconds per minute, used by all duration conversions.
const MS_PER_MINUTE: i64 = 60_000;

/// Rounds a non-negative millisecond count to whole minutes, half up.
pub(crate) fn round_ms_to_minutes(ms: i64) -> i64 {
    (ms.max(0) + MS_PER_MINUTE / 2) / MS_PER_MINUTE
}

/// Truncates a non-negative millisecond count to whole minutes.
pub(crate) fn floor_ms_to_minutes(ms: i64) -> i64 {
    ms.max(0) / MS_PER_MINUTE
}

/// The session state of a work interval.
///
/// The pause machinery only exists while a session is open, and a closed
/// interval always carries its end instant and net duration; encoding both
/// facts in one tagged enum makes combinations such as "paused but already
/// ended" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntervalState {
    /// The session is open and the clock is running.
    Running,
    /// The session is open and a pause is in progress.
    Paused {
        /// When the running pause started.
        since: DateTime<Utc>,
    },
    /// The session has been closed.
    Closed {
        /// When the session ended. Always strictly after the start.
        ended_at: DateTime<Utc>,
        /// Net worked minutes, with accumulated pauses already subtracted.
        duration_minutes: i64,
    },
}

/// One work session with a start instant and optional end instant.
///
/// Created on check-in or manual entry; mutated on check-out, pause toggle
/// or manual edit; deleted explicitly. For a given user at most one interval
/// may be open (non-`Closed`) at any time.
///
/// # Example
///
/// ```
/// use timeclock_engine::models::{IntervalState, WorkInterval};
/// use chrono::{TimeZone, Utc};
/// use uuid::Uuid;
///
/// let interval = WorkInterval::open(
///     Uuid::new_v4(),
///     Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
/// );
/// assert!(interval.is_open());
/// assert_eq!(interval.state, IntervalState::Running);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInterval {
    /// Unique identifier for the interval.
    pub id: Uuid,
    /// The user this interval belongs to.
    pub user_id: Uuid,
    /// When the session started (UTC instant).
    pub started_at: DateTime<Utc>,
    /// The session state: running, paused, or closed.
    #[serde(flatten)]
    pub state: IntervalState,
    /// Accumulated whole pause minutes from completed pauses. A pause that
    /// is still running when the session closes is priced into the net
    /// duration but never folded into this total.
    pub pause_total_minutes: i64,
    /// Informational category tag. Not authoritative for pricing.
    #[serde(default)]
    pub category: Option<String>,
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
    /// Project tag.
    #[serde(default)]
    pub project: Option<String>,
}

impl WorkInterval {
    /// Creates a fresh open interval starting at the given instant.
    pub fn open(user_id: Uuid, started_at: DateTime<Utc>) -> Self {
        WorkInterval {
            id: Uuid::new_v4(),
            user_id,
            started_at,
            state: IntervalState::Running,
            pause_total_minutes: 0,
            category: None,
            note: None,
            project: None,
        }
    }

    /// Returns true while the session has not been closed.
    pub fn is_open(&self) -> bool {
        !matches!(self.state, IntervalState::Closed { .. })
    }

    /// Returns true while a pause is in progress.
    pub fn is_paused(&self) -> bool {
        matches!(self.state, IntervalState::Paused { .. })
    }

    /// The end instant, if the session has been closed.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            IntervalState::Closed { ended_at, .. } => Some(ended_at),
            _ => None,
        }
    }

    /// The stored net duration in minutes, if the session has been closed.
    pub fn duration_minutes(&self) -> Option<i64> {
        match self.state {
            IntervalState::Closed {
                duration_minutes, ..
            } => Some(duration_minutes),
            _ => None,
        }
    }

    /// Milliseconds of the currently running pause, zero when not paused.
    fn running_pause_ms(&self, now: DateTime<Utc>) -> i64 {
        match self.state {
            IntervalState::Paused { since } => (now - since).num_milliseconds().max(0),
            _ => 0,
        }
    }

    /// Total paused milliseconds as of `now`: the accumulated whole-minute
    /// total plus the in-progress pause delta, if one is running.
    pub fn paused_ms_at(&self, now: DateTime<Utc>) -> i64 {
        self.pause_total_minutes * MS_PER_MINUTE + self.running_pause_ms(now)
    }

    /// Net worked minutes as of `now`, rounded half up and never negative.
    ///
    /// This is the figure check-out freezes into the closed state.
    pub fn net_minutes_at(&self, now: DateTime<Utc>) -> i64 {
        let raw_ms = (now - self.started_at).num_milliseconds();
        round_ms_to_minutes(raw_ms - self.paused_ms_at(now))
    }

    /// Whole pause minutes as of `now`, including the truncated in-progress
    /// pause delta when one is running.
    pub fn pause_minutes_at(&self, now: DateTime<Utc>) -> i64 {
        self.pause_total_minutes + floor_ms_to_minutes(self.running_pause_ms(now))
    }

    /// Total pause seconds as of `now`, for live status display.
    pub fn pause_seconds_at(&self, now: DateTime<Utc>) -> i64 {
        self.pause_total_minutes * 60 + self.running_pause_ms(now) / 1000
    }

    /// Half-open overlap test against another interval of the same user.
    ///
    /// An open interval is treated as unbounded on the right. Adjacent
    /// intervals where one ends exactly when the other starts do not
    /// overlap.
    pub fn overlaps(&self, other: &WorkInterval) -> bool {
        let self_ends_after_other_starts = match self.ended_at() {
            Some(end) => other.started_at < end,
            None => true,
        };
        let other_ends_after_self_starts = match other.ended_at() {
            Some(end) => self.started_at < end,
            None => true,
        };
        self_ends_after_other_starts && other_ends_after_self_starts
    }
}

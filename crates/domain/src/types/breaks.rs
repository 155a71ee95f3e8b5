//! Day-relative break ranges
//!
//! A break range is a recurring `[start, end)` period expressed as seconds
//! since local midnight. `end` may equal 86 400 (`24:00`) so a range can run
//! up to the end of the day.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::constants::SECONDS_PER_DAY;
use crate::errors::{PatrolArcError, Result};

/// Half-open time-of-day interval excluded from working time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawBreakRange")]
pub struct BreakRange {
    start_secs: u32,
    end_secs: u32,
}

/// Unchecked wire form; deserialization goes through [`BreakRange::from_secs`].
#[derive(Deserialize)]
struct RawBreakRange {
    start_secs: u32,
    end_secs: u32,
}

impl TryFrom<RawBreakRange> for BreakRange {
    type Error = PatrolArcError;

    fn try_from(raw: RawBreakRange) -> Result<Self> {
        Self::from_secs(raw.start_secs, raw.end_secs)
    }
}

impl BreakRange {
    /// Build a range from seconds since midnight.
    ///
    /// # Errors
    /// Returns `PatrolArcError::Config` when the range is empty, reversed or
    /// extends past `24:00`.
    pub fn from_secs(start_secs: u32, end_secs: u32) -> Result<Self> {
        if end_secs > SECONDS_PER_DAY {
            return Err(PatrolArcError::Config(format!(
                "break range ends after 24:00 ({end_secs}s)"
            )));
        }
        if end_secs <= start_secs {
            return Err(PatrolArcError::Config(format!(
                "break range must end after it starts ({} >= {})",
                format_secs(start_secs),
                format_secs(end_secs)
            )));
        }
        Ok(Self { start_secs, end_secs })
    }

    /// Build a range from hour/minute pairs; `(24, 0)` is accepted as an end.
    pub fn from_hm(start: (u32, u32), end: (u32, u32)) -> Result<Self> {
        Self::from_secs(hm_to_secs(start), hm_to_secs(end))
    }

    /// Parse `"HH:MM"` / `"HH:MM:SS"` bounds; `"24:00"` is a valid end.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::from_secs(parse_time_of_day(start)?, parse_time_of_day(end)?)
    }

    pub fn start_secs(&self) -> u32 {
        self.start_secs
    }

    pub fn end_secs(&self) -> u32 {
        self.end_secs
    }

    /// Seconds of `[from, to)` (seconds since midnight) inside this range.
    pub fn overlap_secs(&self, from: u32, to: u32) -> i64 {
        let lo = from.max(self.start_secs);
        let hi = to.min(self.end_secs);
        i64::from(hi.saturating_sub(lo))
    }
}

impl fmt::Display for BreakRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", format_secs(self.start_secs), format_secs(self.end_secs))
    }
}

/// Seconds since midnight for a wall-clock time.
pub fn seconds_of_day(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight()
}

fn hm_to_secs((hour, minute): (u32, u32)) -> u32 {
    hour * 3_600 + minute * 60
}

fn parse_time_of_day(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    if trimmed == "24:00" || trimmed == "24:00:00" {
        return Ok(SECONDS_PER_DAY);
    }

    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map(seconds_of_day)
        .map_err(|e| PatrolArcError::Config(format!("invalid time of day '{raw}': {e}")))
}

fn format_secs(secs: u32) -> String {
    let (h, rem) = (secs / 3_600, secs % 3_600);
    let (m, s) = (rem / 60, rem % 60);
    if s == 0 {
        format!("{h:02}:{m:02}")
    } else {
        format!("{h:02}:{m:02}:{s:02}")
    }
}

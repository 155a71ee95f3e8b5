//! Break calendar - fixed day-relative table of excluded time
//!
//! Overlaps are computed per range and summed; ranges are not merged into a
//! single excluded interval first, so a visit spanning two distinct breaks
//! loses time from both. Exact duplicate ranges are dropped on construction.

use chrono::NaiveDateTime;
use patrolarc_domain::constants::SECONDS_PER_DAY;
use patrolarc_domain::types::breaks::seconds_of_day;
use patrolarc_domain::{BreakRange, ReportingConfig, Result};
use tracing::debug;

/// Immutable, ordered set of break ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakCalendar {
    ranges: Vec<BreakRange>,
}

impl BreakCalendar {
    /// Build a calendar, keeping the first occurrence of each distinct range.
    pub fn new(ranges: impl IntoIterator<Item = BreakRange>) -> Self {
        let mut kept: Vec<BreakRange> = Vec::new();
        for range in ranges {
            if kept.contains(&range) {
                debug!(range = %range, "dropping duplicate break range");
                continue;
            }
            kept.push(range);
        }
        Self { ranges: kept }
    }

    /// Calendar with no breaks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from `reporting.break_ranges`.
    ///
    /// # Errors
    /// `PatrolArcError::Config` for malformed ranges.
    pub fn from_config(config: &ReportingConfig) -> Result<Self> {
        Ok(Self::new(config.parsed_break_ranges()?))
    }

    pub fn ranges(&self) -> &[BreakRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Seconds of break time inside the time-of-day span of a visit.
    ///
    /// When `submit`'s time of day is earlier than `arrive`'s the visit
    /// crossed midnight and the span is split into `[arrive, 24:00)` and
    /// `[00:00, submit)`.
    pub fn break_secs_within(&self, arrive: NaiveDateTime, submit: NaiveDateTime) -> i64 {
        let from = seconds_of_day(arrive.time());
        let to = seconds_of_day(submit.time());

        if to < from {
            self.overlap_sum(from, SECONDS_PER_DAY) + self.overlap_sum(0, to)
        } else {
            self.overlap_sum(from, to)
        }
    }

    fn overlap_sum(&self, from: u32, to: u32) -> i64 {
        self.ranges.iter().map(|range| range.overlap_secs(from, to)).sum()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn range(start: (u32, u32), end: (u32, u32)) -> BreakRange {
        BreakRange::from_hm(start, end).unwrap()
    }

    #[test]
    fn single_break_overlap() {
        let calendar = BreakCalendar::new([range((9, 0), (9, 10))]);
        assert_eq!(calendar.break_secs_within(at(6, 8, 50), at(6, 9, 10)), 600);
    }

    #[test]
    fn midnight_crossing_splits_span() {
        let calendar = BreakCalendar::new([range((0, 0), (0, 5))]);
        assert_eq!(calendar.break_secs_within(at(6, 23, 50), at(7, 0, 10)), 300);
    }

    #[test]
    fn midnight_crossing_counts_both_sides() {
        let calendar =
            BreakCalendar::new([range((23, 55), (24, 0)), range((0, 0), (0, 5))]);
        assert_eq!(calendar.break_secs_within(at(6, 23, 50), at(7, 0, 10)), 600);
    }

    #[test]
    fn distinct_breaks_subtract_independently() {
        let calendar = BreakCalendar::new([range((10, 0), (10, 10)), range((12, 0), (12, 45))]);
        assert_eq!(calendar.break_secs_within(at(6, 9, 0), at(6, 13, 0)), 55 * 60);
    }

    #[test]
    fn overlapping_breaks_are_not_merged() {
        let calendar = BreakCalendar::new([range((12, 0), (12, 45)), range((12, 30), (13, 0))]);
        // 45 + 30, even though the union is only 60 minutes
        assert_eq!(calendar.break_secs_within(at(6, 11, 0), at(6, 14, 0)), 75 * 60);
    }

    #[test]
    fn exact_duplicates_are_dropped() {
        let calendar = BreakCalendar::new([
            range((12, 0), (12, 45)),
            range((15, 0), (15, 10)),
            range((12, 0), (12, 45)),
        ]);

        assert_eq!(calendar.ranges().len(), 2);
        assert_eq!(calendar.break_secs_within(at(6, 11, 0), at(6, 14, 0)), 45 * 60);
    }

    #[test]
    fn empty_calendar_subtracts_nothing() {
        let calendar = BreakCalendar::empty();
        assert!(calendar.is_empty());
        assert_eq!(calendar.break_secs_within(at(6, 0, 0), at(6, 23, 0)), 0);
    }

    #[test]
    fn from_default_config() {
        let calendar = BreakCalendar::from_config(&ReportingConfig::default()).unwrap();
        assert!(!calendar.is_empty());
    }
}

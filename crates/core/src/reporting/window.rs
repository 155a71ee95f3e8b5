//! Production-day reporting windows
//!
//! A production day starts at a configured local time and spans a fixed
//! number of minutes, e.g. 07:00 to 08:00 the next morning.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use patrolarc_domain::{PatrolArcError, ReportWindow, ReportingConfig, Result};

/// Maps calendar dates to reporting windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionDay {
    day_start: NaiveTime,
    span: Duration,
}

impl ProductionDay {
    /// # Errors
    /// `PatrolArcError::Config` when `span_minutes` is zero.
    pub fn new(day_start: NaiveTime, span_minutes: u32) -> Result<Self> {
        if span_minutes == 0 {
            return Err(PatrolArcError::Config(
                "reporting.day_span_minutes must be positive".into(),
            ));
        }
        Ok(Self { day_start, span: Duration::minutes(i64::from(span_minutes)) })
    }

    pub fn from_config(config: &ReportingConfig) -> Result<Self> {
        Self::new(config.day_start_time()?, config.day_span_minutes)
    }

    /// Window `[date + day_start, date + day_start + span)`.
    pub fn window_for(&self, date: NaiveDate) -> ReportWindow {
        let start = date.and_time(self.day_start);
        ReportWindow { date, start, end: start + self.span }
    }

    /// Production date whose day started most recently at or before `ts`.
    pub fn date_of(&self, ts: NaiveDateTime) -> NaiveDate {
        let date = ts.date();
        if ts.time() < self.day_start {
            date.pred_opt().unwrap_or(date)
        } else {
            date
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn default_window_runs_into_next_morning() {
        let day = ProductionDay::from_config(&ReportingConfig::default()).unwrap();
        let window = day.window_for(date(6));

        assert_eq!(window.start, date(6).and_hms_opt(7, 0, 0).unwrap());
        assert_eq!(window.end, date(7).and_hms_opt(8, 0, 0).unwrap());
        assert!(window.contains(date(7).and_hms_opt(7, 59, 59).unwrap()));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn early_morning_belongs_to_previous_day() {
        let day = ProductionDay::new(NaiveTime::from_hms_opt(7, 0, 0).unwrap(), 1_500).unwrap();

        assert_eq!(day.date_of(date(7).and_hms_opt(3, 0, 0).unwrap()), date(6));
        assert_eq!(day.date_of(date(7).and_hms_opt(7, 0, 0).unwrap()), date(7));
    }

    #[test]
    fn zero_span_is_rejected() {
        let start = NaiveTime::from_hms_opt(7, 0, 0).unwrap();
        assert!(matches!(ProductionDay::new(start, 0), Err(PatrolArcError::Config(_))));
    }
}

//! Working-time aggregator - turns visit records into net working minutes
//!
//! # Algorithm
//! Per worker (grouped by `worker_id`, output in worker-id order):
//! 1. Keep closed visits whose inspect type is in the valid-type allow-list.
//!    Open visits and the cancel sentinel never contribute.
//! 2. Dedup-sensitive types collapse visits of the same type sharing the
//!    exact same `(arrive_at, submit_data_at)` pair to the first one seen.
//!    Other types are summed as-is.
//! 3. Net time per visit is `max(0, raw - Σ break overlaps)` where overlaps
//!    come from the [`BreakCalendar`].
//! 4. `valid_working_minutes` is the sum of net time; `total_working_minutes`
//!    is the configured nominal shift length.
//!
//! Arithmetic is done in whole seconds and converted to minutes at the end.

use std::collections::{BTreeMap, HashSet};

use ahash::AHashSet;
use chrono::NaiveDateTime;
use patrolarc_domain::constants::{CANCEL_INSPECT_TYPE, SECONDS_PER_MINUTE};
use patrolarc_domain::{
    AggregatedWorkerActivity, ReportingConfig, Result, Visit, VisitContribution,
};
use tracing::debug;

use super::break_calendar::BreakCalendar;

/// Decides which inspect types are prone to duplicate rows.
#[derive(Debug, Clone, Default)]
pub struct DedupPolicy {
    exact: AHashSet<String>,
    patterns: Vec<String>,
}

impl DedupPolicy {
    /// `exact` names match whole types; `patterns` match as substrings.
    pub fn new<E, P>(exact: E, patterns: P) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            exact: exact.into_iter().map(Into::into).collect(),
            patterns: patterns
                .into_iter()
                .map(Into::into)
                .filter(|pattern: &String| !pattern.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &ReportingConfig) -> Self {
        Self::new(config.dedup_types.iter().cloned(), config.dedup_type_patterns.iter().cloned())
    }

    pub fn is_dedup_sensitive(&self, inspect_type: &str) -> bool {
        self.exact.contains(inspect_type)
            || self.patterns.iter().any(|pattern| inspect_type.contains(pattern.as_str()))
    }
}

/// Computes per-worker working time for a reporting window.
#[derive(Debug, Clone)]
pub struct WorkingTimeAggregator {
    calendar: BreakCalendar,
    dedup: DedupPolicy,
    nominal_shift_minutes: f64,
}

impl WorkingTimeAggregator {
    pub fn new(calendar: BreakCalendar, dedup: DedupPolicy, nominal_shift_minutes: u32) -> Self {
        Self { calendar, dedup, nominal_shift_minutes: f64::from(nominal_shift_minutes) }
    }

    /// Build from the reporting section of the configuration.
    ///
    /// # Errors
    /// `PatrolArcError::Config` when the break table is malformed.
    pub fn from_config(config: &ReportingConfig) -> Result<Self> {
        Ok(Self::new(
            BreakCalendar::from_config(config)?,
            DedupPolicy::from_config(config),
            config.nominal_shift_minutes,
        ))
    }

    pub fn calendar(&self) -> &BreakCalendar {
        &self.calendar
    }

    /// Net working seconds of a closed visit; `None` while it is open.
    pub fn net_secs(&self, visit: &Visit) -> Option<i64> {
        let submit = visit.submit_data_at?;
        Some(self.net_secs_between(visit.arrive_at, submit))
    }

    fn net_secs_between(&self, arrive: NaiveDateTime, submit: NaiveDateTime) -> i64 {
        let raw = (submit - arrive).num_seconds().max(0);
        let breaks = self.calendar.break_secs_within(arrive, submit);
        (raw - breaks).max(0)
    }

    /// Aggregate all visits of a window into per-worker activity.
    ///
    /// Every worker with at least one visit appears, even with zero minutes.
    pub fn aggregate(
        &self,
        visits: &[Visit],
        valid_types: &HashSet<String>,
    ) -> Vec<AggregatedWorkerActivity> {
        let mut by_worker: BTreeMap<&str, Vec<&Visit>> = BTreeMap::new();
        for visit in visits {
            by_worker.entry(visit.worker_id.as_str()).or_default().push(visit);
        }

        by_worker
            .into_values()
            .map(|mut worker_visits| {
                // Stable: equal arrival times keep their input order.
                worker_visits.sort_by_key(|visit| visit.arrive_at);
                self.aggregate_worker(&worker_visits, valid_types)
            })
            .collect()
    }

    fn aggregate_worker(
        &self,
        visits: &[&Visit],
        valid_types: &HashSet<String>,
    ) -> AggregatedWorkerActivity {
        // Keyed per inspect type: rows of different types never collapse.
        let mut seen_pairs: AHashSet<(&str, NaiveDateTime, NaiveDateTime)> = AHashSet::new();
        let mut contributions = Vec::new();
        let mut valid_secs: i64 = 0;
        let mut collapsed = 0usize;

        for visit in visits {
            let Some(submit) = visit.submit_data_at else { continue };
            if visit.inspect_type == CANCEL_INSPECT_TYPE
                || !valid_types.contains(&visit.inspect_type)
            {
                continue;
            }

            if self.dedup.is_dedup_sensitive(&visit.inspect_type)
                && !seen_pairs.insert((visit.inspect_type.as_str(), visit.arrive_at, submit))
            {
                collapsed += 1;
                continue;
            }

            let net = self.net_secs_between(visit.arrive_at, submit);
            valid_secs += net;
            contributions.push(VisitContribution {
                record_id: visit.record_id.clone(),
                device_id: visit.device_id.clone(),
                area: visit.area.clone(),
                net_minutes: secs_to_minutes(net),
            });
        }

        let first = visits.first();
        let worker_id = first.map(|v| v.worker_id.clone()).unwrap_or_default();
        let worker_name = visits
            .iter()
            .map(|v| v.worker_name.as_str())
            .find(|name| !name.is_empty())
            .unwrap_or_default()
            .to_string();

        if collapsed > 0 {
            debug!(worker_id = %worker_id, collapsed, "collapsed duplicate visit rows");
        }

        AggregatedWorkerActivity {
            worker_id,
            worker_name,
            visits: visits.iter().map(|v| (*v).clone()).collect(),
            total_working_minutes: self.nominal_shift_minutes,
            valid_working_minutes: secs_to_minutes(valid_secs),
            contributions,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn secs_to_minutes(secs: i64) -> f64 {
    secs as f64 / SECONDS_PER_MINUTE as f64
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use patrolarc_domain::BreakRange;

    use super::*;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn visit(
        id: &str,
        worker: &str,
        inspect_type: &str,
        arrive: NaiveDateTime,
        submit: Option<NaiveDateTime>,
    ) -> Visit {
        Visit {
            record_id: id.to_string(),
            worker_id: worker.to_string(),
            worker_name: format!("name-{worker}"),
            device_id: "DEV-1".to_string(),
            area: "Line A".to_string(),
            inspect_type: inspect_type.to_string(),
            work_order: None,
            arrive_at: arrive,
            submit_data_at: submit,
            source: "NFC".to_string(),
            ok_count: None,
            ng_count: None,
        }
    }

    fn valid(types: &[&str]) -> HashSet<String> {
        types.iter().map(|t| (*t).to_string()).collect()
    }

    fn aggregator(breaks: Vec<BreakRange>) -> WorkingTimeAggregator {
        WorkingTimeAggregator::new(
            BreakCalendar::new(breaks),
            DedupPolicy::new(["incoming inspection"], ["full inspection"]),
            480,
        )
    }

    #[test]
    fn break_overlap_is_subtracted() {
        let agg = aggregator(vec![BreakRange::from_hm((9, 0), (9, 10)).unwrap()]);
        let visits = [visit("r1", "W1", "A", at(6, 8, 50), Some(at(6, 9, 10)))];

        let result = agg.aggregate(&visits, &valid(&["A"]));
        assert_eq!(result[0].valid_working_minutes, 10.0);
    }

    #[test]
    fn midnight_crossing_visit() {
        let agg = aggregator(vec![BreakRange::from_hm((0, 0), (0, 5)).unwrap()]);
        let visits = [visit("r1", "W1", "A", at(6, 23, 50), Some(at(7, 0, 10)))];

        let result = agg.aggregate(&visits, &valid(&["A"]));
        assert_eq!(result[0].valid_working_minutes, 15.0);
    }

    #[test]
    fn net_is_never_negative() {
        // Two overlapping breaks both cover the whole visit.
        let agg = aggregator(vec![
            BreakRange::from_hm((12, 0), (12, 45)).unwrap(),
            BreakRange::from_hm((12, 0), (12, 30)).unwrap(),
        ]);
        let visits = [visit("r1", "W1", "A", at(6, 12, 5), Some(at(6, 12, 25)))];

        let result = agg.aggregate(&visits, &valid(&["A"]));
        assert_eq!(result[0].valid_working_minutes, 0.0);
        assert_eq!(result[0].contributions[0].net_minutes, 0.0);
    }

    #[test]
    fn dedup_sensitive_pairs_count_once() {
        let agg = aggregator(vec![]);
        let visits = [
            visit("r1", "W1", "incoming inspection", at(6, 9, 0), Some(at(6, 9, 30))),
            visit("r2", "W1", "incoming inspection", at(6, 9, 0), Some(at(6, 9, 30))),
        ];

        let result = agg.aggregate(&visits, &valid(&["incoming inspection"]));
        assert_eq!(result[0].valid_working_minutes, 30.0);
        assert_eq!(result[0].contributions.len(), 1);
        assert_eq!(result[0].contributions[0].record_id, "r1");
        // The visit list itself is not deduplicated.
        assert_eq!(result[0].visits.len(), 2);
    }

    #[test]
    fn pattern_matched_types_are_deduplicated() {
        let agg = aggregator(vec![]);
        let visits = [
            visit("r1", "W1", "line full inspection", at(6, 10, 0), Some(at(6, 10, 20))),
            visit("r2", "W1", "line full inspection", at(6, 10, 0), Some(at(6, 10, 20))),
            visit("r3", "W1", "line full inspection", at(6, 10, 0), Some(at(6, 10, 25))),
        ];

        let result = agg.aggregate(&visits, &valid(&["line full inspection"]));
        assert_eq!(result[0].valid_working_minutes, 45.0);
    }

    #[test]
    fn different_dedup_types_with_same_times_both_count() {
        let agg = aggregator(vec![]);
        let visits = [
            visit("r1", "W1", "incoming inspection", at(6, 11, 0), Some(at(6, 11, 15))),
            visit("r2", "W1", "line full inspection", at(6, 11, 0), Some(at(6, 11, 15))),
        ];

        let result =
            agg.aggregate(&visits, &valid(&["incoming inspection", "line full inspection"]));
        assert_eq!(result[0].valid_working_minutes, 30.0);
        assert_eq!(result[0].contributions.len(), 2);
    }

    #[test]
    fn normal_types_are_not_deduplicated() {
        let agg = aggregator(vec![]);
        let visits = [
            visit("r1", "W1", "patrol", at(6, 9, 0), Some(at(6, 9, 30))),
            visit("r2", "W1", "patrol", at(6, 9, 0), Some(at(6, 9, 30))),
        ];

        let result = agg.aggregate(&visits, &valid(&["patrol"]));
        assert_eq!(result[0].valid_working_minutes, 60.0);
    }

    #[test]
    fn open_invalid_and_cancelled_visits_contribute_nothing() {
        let agg = aggregator(vec![]);
        let visits = [
            visit("r1", "W1", "patrol", at(6, 9, 0), None),
            visit("r2", "W1", "unlisted", at(6, 10, 0), Some(at(6, 10, 30))),
            visit("r3", "W1", CANCEL_INSPECT_TYPE, at(6, 11, 0), Some(at(6, 11, 30))),
        ];

        // Even a misconfigured allow-list containing the sentinel is ignored.
        let result = agg.aggregate(&visits, &valid(&["patrol", CANCEL_INSPECT_TYPE]));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].valid_working_minutes, 0.0);
        assert!(result[0].contributions.is_empty());
        assert_eq!(result[0].visits.len(), 3);
    }

    #[test]
    fn workers_ordered_by_id_with_nominal_total() {
        let agg = aggregator(vec![]);
        let visits = [
            visit("r1", "W2", "A", at(6, 9, 0), Some(at(6, 9, 30))),
            visit("r2", "W1", "A", at(6, 8, 0), Some(at(6, 8, 15))),
        ];

        let result = agg.aggregate(&visits, &valid(&["A"]));
        let ids: Vec<_> = result.iter().map(|a| a.worker_id.as_str()).collect();
        assert_eq!(ids, ["W1", "W2"]);
        assert!(result.iter().all(|a| a.total_working_minutes == 480.0));
        assert_eq!(result[0].worker_name, "name-W1");
    }

    #[test]
    fn fractional_minutes_are_kept() {
        let agg = aggregator(vec![]);
        let arrive = at(6, 9, 0);
        let submit = arrive + chrono::Duration::seconds(90);
        let visits = [visit("r1", "W1", "A", arrive, Some(submit))];

        let result = agg.aggregate(&visits, &valid(&["A"]));
        assert_eq!(result[0].valid_working_minutes, 1.5);
    }

    #[test]
    fn worked_example_from_two_visits() {
        let agg = aggregator(vec![BreakRange::from_hm((8, 0), (8, 10)).unwrap()]);
        let visits = [
            visit("r1", "W1", "A", at(6, 7, 5), Some(at(6, 8, 30))),
            visit("r2", "W1", "A", at(6, 8, 30), Some(at(6, 9, 0))),
        ];

        let result = agg.aggregate(&visits, &valid(&["A"]));
        // (85 - 10) + 30
        assert_eq!(result[0].valid_working_minutes, 105.0);
    }

    #[test]
    fn empty_input_yields_no_workers() {
        let agg = aggregator(vec![]);
        assert!(agg.aggregate(&[], &valid(&["A"])).is_empty());
    }
}

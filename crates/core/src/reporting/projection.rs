//! Reporting projection - device and time-slot views of aggregated activity

use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;
use patrolarc_domain::constants::DEFAULT_SLOT_MINUTES;
use patrolarc_domain::{
    AggregatedWorkerActivity, DeviceActivity, ReportWindow, TimeSlotActivity,
};

#[derive(Default)]
struct DeviceTally<'a> {
    area: &'a str,
    visit_count: usize,
    workers: BTreeSet<&'a str>,
    minutes: f64,
}

#[derive(Default)]
struct SlotTally<'a> {
    visit_count: usize,
    workers: BTreeSet<&'a str>,
}

/// Shapes aggregator output for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportProjector {
    slot_minutes: u32,
}

impl Default for ReportProjector {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_MINUTES)
    }
}

impl ReportProjector {
    /// Slots narrower than one minute are widened to one minute.
    pub fn new(slot_minutes: u32) -> Self {
        Self { slot_minutes: slot_minutes.max(1) }
    }

    /// Per-device counts and contributed minutes, ordered by device id.
    pub fn by_device(&self, workers: &[AggregatedWorkerActivity]) -> Vec<DeviceActivity> {
        let mut devices: BTreeMap<&str, DeviceTally<'_>> = BTreeMap::new();

        for activity in workers {
            for visit in &activity.visits {
                let tally = devices.entry(visit.device_id.as_str()).or_default();
                if tally.area.is_empty() {
                    tally.area = visit.area.as_str();
                }
                tally.visit_count += 1;
                tally.workers.insert(visit.worker_id.as_str());
            }
            for contribution in &activity.contributions {
                devices.entry(contribution.device_id.as_str()).or_default().minutes +=
                    contribution.net_minutes;
            }
        }

        devices
            .into_iter()
            .map(|(device_id, tally)| DeviceActivity {
                device_id: device_id.to_string(),
                area: tally.area.to_string(),
                visit_count: tally.visit_count,
                worker_ids: tally.workers.into_iter().map(str::to_string).collect(),
                valid_working_minutes: tally.minutes,
            })
            .collect()
    }

    /// Visits bucketed by arrival into fixed slots aligned to the window
    /// start, then by device. Visits outside the window are skipped.
    pub fn by_time_slot(
        &self,
        window: &ReportWindow,
        workers: &[AggregatedWorkerActivity],
    ) -> Vec<TimeSlotActivity> {
        let slot_secs = i64::from(self.slot_minutes) * 60;
        let mut slots: BTreeMap<(i64, &str), SlotTally<'_>> = BTreeMap::new();

        for visit in workers.iter().flat_map(|activity| activity.visits.iter()) {
            if !window.contains(visit.arrive_at) {
                continue;
            }
            let index = (visit.arrive_at - window.start).num_seconds() / slot_secs;
            let tally = slots.entry((index, visit.device_id.as_str())).or_default();
            tally.visit_count += 1;
            tally.workers.insert(visit.worker_name.as_str());
        }

        slots
            .into_iter()
            .map(|((index, device_id), tally)| {
                let slot_start = window.start + Duration::seconds(index * slot_secs);
                TimeSlotActivity {
                    slot_start,
                    slot_end: (slot_start + Duration::seconds(slot_secs)).min(window.end),
                    device_id: device_id.to_string(),
                    visit_count: tally.visit_count,
                    worker_names: tally.workers.into_iter().map(str::to_string).collect(),
                }
            })
            .collect()
    }
}

//! Shared test helpers for `patrolarc-core` integration tests.
//!
//! In-memory ports and fixtures so lifecycle and reporting tests can focus on
//! behaviour instead of storage.

#![allow(dead_code)]

pub mod repositories;

use chrono::{NaiveDate, NaiveDateTime};
use patrolarc_domain::{DeviceRef, WorkerIdentity};

pub fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap().and_hms_opt(h, m, 0).unwrap()
}

pub fn worker(id: &str) -> WorkerIdentity {
    WorkerIdentity::new(id, format!("worker {id}"))
}

pub fn press() -> DeviceRef {
    DeviceRef::new("CARD-PRESS", "DEV-PRESS", "Press 1", "Line A")
}

pub fn lathe() -> DeviceRef {
    DeviceRef::new("CARD-LATHE", "DEV-LATHE", "Lathe 3", "Line B")
}

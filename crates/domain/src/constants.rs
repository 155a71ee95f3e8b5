//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

/// Inspect type written onto a visit when it is cancelled.
pub const CANCEL_INSPECT_TYPE: &str = "CANCEL";

/// Source tag for visits opened by an NFC tap.
pub const SOURCE_NFC: &str = "NFC";

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_DAY: u32 = 86_400;

// Production day defaults (07:00 to 08:00 the next morning)
pub const DEFAULT_DAY_START: &str = "07:00";
pub const DEFAULT_DAY_SPAN_MINUTES: u32 = 1_500;

// Nominal shift length shown next to computed minutes
pub const DEFAULT_NOMINAL_SHIFT_MINUTES: u32 = 480;

pub const DEFAULT_SLOT_MINUTES: u32 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_VALID_TYPES_TTL_SECS: u64 = 300;

/// Inspect types known to produce duplicate rows for one physical event.
pub const DEFAULT_DEDUP_TYPES: &[&str] = &["incoming inspection"];

/// Substrings that mark an inspect type as dedup-sensitive.
pub const DEFAULT_DEDUP_TYPE_PATTERNS: &[&str] = &["full inspection"];

/// Default meal and rest breaks, day-relative `[start, end)`.
pub const DEFAULT_BREAK_RANGES: &[(&str, &str)] = &[
    ("10:00", "10:10"),
    ("12:00", "12:45"),
    ("15:00", "15:10"),
    ("17:30", "18:00"),
    ("22:00", "22:10"),
    ("00:00", "00:45"),
    ("03:00", "03:10"),
    ("05:30", "06:00"),
];

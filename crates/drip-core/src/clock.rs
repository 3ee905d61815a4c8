//! Fixed-offset timestamps for the durable schedule documents.
//!
//! Every persisted timestamp uses one fixed UTC offset (from config) and
//! the fixed `%Y-%m-%dT%H:%M:%S` format — no offset suffix, no sub-second
//! precision. Two sentinel values are first-class schedule states rather
//! than errors:
//!
//! | Sentinel   | Value                 | Meaning                      |
//! |------------|-----------------------|------------------------------|
//! | `MIN_TIME` | 1970-01-01T00:00:00Z  | already due (first contact)  |
//! | `NEVER`    | 9999-12-31T23:59:59   | never due again              |
//!
//! Both sentinels are chosen to round-trip through the persisted format;
//! chrono's `DateTime::MIN_UTC`/`MAX_UTC` would not.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::error::{DripError, Result};

/// A schedule timestamp in the configured fixed offset.
pub type Timestamp = DateTime<FixedOffset>;

/// Persisted timestamp format. Fixed; the offset is implied by config.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Build the fixed offset for `hours` east of UTC.
pub fn zone(hours: i32) -> Result<FixedOffset> {
    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| DripError::Config(format!("utc_offset_hours out of range: {hours}")))
}

/// Current time in `zone`.
pub fn now(zone: FixedOffset) -> Timestamp {
    Utc::now().with_timezone(&zone)
}

/// The "already due" sentinel: the Unix epoch, rendered in `zone`.
pub fn min_time(zone: FixedOffset) -> Timestamp {
    zone.timestamp_opt(0, 0).unwrap()
}

/// The "never due again" sentinel.
pub fn never(zone: FixedOffset) -> Timestamp {
    zone.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()
}

/// True when `ts` is the never-sentinel (or anything equally absurdly far out).
pub fn is_never(ts: Timestamp) -> bool {
    use chrono::Datelike;
    ts.year() >= 9999
}

/// Render `ts` in the persisted format.
pub fn format_ts(ts: Timestamp) -> String {
    ts.format(TIME_FORMAT).to_string()
}

/// Parse a persisted timestamp, interpreting it in `zone`.
pub fn parse_ts(s: &str, zone: FixedOffset) -> Result<Timestamp> {
    let naive = NaiveDateTime::parse_from_str(s, TIME_FORMAT)
        .map_err(|e| DripError::Timestamp(format!("{s:?}: {e}")))?;
    naive
        .and_local_timezone(zone)
        .single()
        .ok_or_else(|| DripError::Timestamp(format!("{s:?}: ambiguous in fixed offset")))
}

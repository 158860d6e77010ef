// libs/scheduling-cell/src/services/timegrid.rs
//
// Pure time-grid quantization. All appointment start times and durations are
// aligned to a fixed 10-minute grid.

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::models::ValidationIssue;

pub const SLOT_MINUTES: u32 = 10;
pub const MIN_DURATION_MINUTES: i32 = 10;
/// 8-hour ceiling on a single appointment.
pub const MAX_DURATION_MINUTES: i32 = 480;

/// Validates that a timestamp lies on the grid: minute a multiple of 10 and
/// no seconds or sub-second component. Identity on success, so it is
/// trivially idempotent.
pub fn normalize(t: DateTime<Utc>) -> Result<DateTime<Utc>, ValidationIssue> {
    if t.minute() % SLOT_MINUTES != 0 || t.second() != 0 || t.nanosecond() != 0 {
        return Err(ValidationIssue::NotAligned);
    }
    Ok(t)
}

pub fn validate_duration(minutes: i32) -> Result<(), ValidationIssue> {
    if minutes < MIN_DURATION_MINUTES
        || minutes > MAX_DURATION_MINUTES
        || minutes % (SLOT_MINUTES as i32) != 0
    {
        return Err(ValidationIssue::InvalidDuration { minutes });
    }
    Ok(())
}

pub fn slot_end(start: DateTime<Utc>, duration_minutes: i32) -> DateTime<Utc> {
    start + Duration::minutes(duration_minutes as i64)
}

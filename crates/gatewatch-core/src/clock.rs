//! Wall-clock helpers: Unix milliseconds, local hour/minute/second, and
//! compact UTC stamps for export file names.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch (0 for pre-epoch times).
pub fn unix_ms(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Local `(hour, minute, second)` for a point in time.
///
/// Falls back to UTC where the platform offers no local-time conversion.
pub fn local_hms(at: SystemTime) -> (u32, u32, u32) {
    let secs = at.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs();
    #[cfg(unix)]
    {
        if let Some(hms) = unix_local_hms(secs) {
            return hms;
        }
    }
    let (_, _, _, h, m, s) = secs_to_utc(secs);
    (h as u32, m as u32, s as u32)
}

#[cfg(unix)]
fn unix_local_hms(secs: u64) -> Option<(u32, u32, u32)> {
    let t = libc::time_t::try_from(secs).ok()?;
    // SAFETY: `tm` is plain old data; localtime_r writes into it and returns
    // null on failure without retaining either pointer.
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    let res = unsafe { libc::localtime_r(&t, &mut tm) };
    if res.is_null() {
        return None;
    }
    Some((tm.tm_hour as u32, tm.tm_min as u32, tm.tm_sec as u32))
}

/// Format a duration-since-epoch as a compact ISO-8601 UTC stamp.
/// Example: `2026-02-15T013000Z`
pub fn format_iso8601_compact(since_epoch: Duration) -> String {
    let (year, month, day, hour, min, sec) = secs_to_utc(since_epoch.as_secs());
    format!("{year:04}-{month:02}-{day:02}T{hour:02}{min:02}{sec:02}Z")
}

/// Convert seconds since Unix epoch to (year, month, day, hour, minute, second) UTC.
/// No leap second handling.
fn secs_to_utc(secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    let sec = secs % 60;
    let min = (secs / 60) % 60;
    let hour = (secs / 3600) % 24;

    let mut days = secs / 86400;
    let mut year = 1970u64;
    loop {
        let days_in_year = if is_leap(year) { 366 } else { 365 };
        if days < days_in_year {
            break;
        }
        days -= days_in_year;
        year += 1;
    }

    let feb = if is_leap(year) { 29 } else { 28 };
    let months_days = [31, feb, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut month = 12u64;
    for (i, &md) in months_days.iter().enumerate() {
        if days < md {
            month = i as u64 + 1;
            break;
        }
        days -= md;
    }

    (year, month, days + 1, hour, min, sec)
}

fn is_leap(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

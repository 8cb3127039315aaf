//! Expiry computation for access codes.
//!
//! Everything here is pure: callers pass the relevant instants explicitly,
//! so the clock only enters at the service layer. Two duration models are
//! supported, whole days (the default, 30 when unset) and fractional hours,
//! mirroring the `expiryDays` / `expiryValue` + `isHoursMode` fields carried
//! by persisted records.

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Canonical timestamp format used when writing records.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default validity window in days when a record carries none.
pub const DEFAULT_EXPIRY_DAYS: i64 = 30;

/// Known timestamp formats accepted from pre-existing data, tried in order.
const KNOWN_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.3fZ",
    "%Y-%m-%dT%H:%M:%SZ",
];

/// Validity window of a code, tagged by unit.
///
/// `Days(0)` is interpreted as the 30-day default; hours are fractional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExpiryWindow {
    Days(i64),
    Hours(f64),
}

impl ExpiryWindow {
    /// Derive the window from the persisted fields. Hours mode only applies
    /// when the record both flags it and carries a positive value; anything
    /// else falls back to days.
    pub fn from_fields(is_hours_mode: bool, expiry_value: f64, expiry_days: i64) -> Self {
        if is_hours_mode && expiry_value > 0.0 {
            ExpiryWindow::Hours(expiry_value)
        } else {
            ExpiryWindow::Days(expiry_days)
        }
    }

    pub fn is_hours(&self) -> bool {
        matches!(self, ExpiryWindow::Hours(_))
    }
}

/// Compute the expiry instant for a code assigned at `assigned_at`.
pub fn compute_expiry(assigned_at: NaiveDateTime, window: ExpiryWindow) -> NaiveDateTime {
    match window {
        ExpiryWindow::Hours(hours) => {
            assigned_at + Duration::seconds((hours * 3600.0).round() as i64)
        }
        ExpiryWindow::Days(days) => {
            let days = if days <= 0 { DEFAULT_EXPIRY_DAYS } else { days };
            assigned_at + Duration::days(days)
        }
    }
}

/// Parse a persisted timestamp, trying each known format before a generic
/// RFC 3339 fallback. Returns None when nothing matches.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for format in KNOWN_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
            return Some(ts);
        }
    }

    // Date-only records start the day at midnight
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .ok()
}

/// Format a timestamp in the canonical persisted form.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Remaining-time report for a code with a known assignment instant.
pub fn report_from_assignment(
    now: NaiveDateTime,
    assigned_at: NaiveDateTime,
    window: ExpiryWindow,
) -> String {
    let expiry = compute_expiry(assigned_at, window);
    let assigned_str = format_timestamp(assigned_at);
    let expiry_str = format_timestamp(expiry);

    let secs = (expiry - now).num_seconds();
    if secs <= 0 {
        return format!("Registered: {}\nExpired: {}", assigned_str, expiry_str);
    }

    let summary = if window.is_hours() {
        hours_mode_summary(secs)
    } else {
        days_mode_summary(secs)
    };

    format!(
        "Registered: {}\nExpires: {}\n\n({})",
        assigned_str, expiry_str, summary
    )
}

/// Remaining-time report for a legacy record that only carries an absolute
/// expiry. The registration instant is estimated as 30 days before expiry,
/// for display only; it is never written back.
pub fn report_legacy(now: NaiveDateTime, expiry: NaiveDateTime) -> String {
    let estimated_assigned = expiry - Duration::days(DEFAULT_EXPIRY_DAYS);
    let assigned_str = format_timestamp(estimated_assigned);
    let expiry_str = format_timestamp(expiry);

    let secs = (expiry - now).num_seconds();
    if secs <= 0 {
        return format!("Registered: {}\nExpired: {}", assigned_str, expiry_str);
    }

    format!(
        "Registered: {}\nExpires: {}\n\n({})",
        assigned_str,
        expiry_str,
        days_mode_summary(secs)
    )
}

/// Whole days remaining, rounded up.
fn days_mode_summary(secs: i64) -> String {
    let days = (secs + 86_399) / 86_400;
    format!("{} day{} remaining", days, plural(days))
}

/// Hours and minutes remaining, rounded down; escalates to a day+hour
/// breakdown past 24 hours and to ceiling-rounded minutes under one hour.
fn hours_mode_summary(secs: i64) -> String {
    let total_hours = secs / 3600;
    let minutes = (secs % 3600) / 60;

    if total_hours >= 24 {
        let days = total_hours / 24;
        let hours = total_hours % 24;
        if hours > 0 {
            format!(
                "{} day{} {} hour{} remaining",
                days,
                plural(days),
                hours,
                plural(hours)
            )
        } else {
            format!("{} day{} remaining", days, plural(days))
        }
    } else if total_hours > 0 {
        if minutes > 0 {
            format!(
                "{} hour{} {} minute{} remaining",
                total_hours,
                plural(total_hours),
                minutes,
                plural(minutes)
            )
        } else {
            format!("{} hour{} remaining", total_hours, plural(total_hours))
        }
    } else {
        let total_minutes = (secs + 59) / 60;
        format!("{} minute{} remaining", total_minutes, plural(total_minutes))
    }
}

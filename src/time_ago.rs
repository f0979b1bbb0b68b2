use chrono::{DateTime, Utc};

/// Display units, largest first. Years are 365 days and months 30 days;
/// the labels are approximate on purpose and must stay stable.
const UNITS: [(f64, &str); 5] = [
    (31_536_000.0, "y"),
    (2_592_000.0, "mo"),
    (86_400.0, "d"),
    (3_600.0, "h"),
    (60.0, "m"),
];

/// Relative "3h ago" label for a comment or review timestamp.
pub fn time_ago(timestamp: DateTime<Utc>) -> String {
    time_ago_at(timestamp, Utc::now())
}

/// Same as [`time_ago`] against an explicit "now".
///
/// A unit is only used once the elapsed time is strictly more than one of
/// it, so exactly 60 seconds still reads "60s ago". Timestamps after `now`
/// are not guarded and produce a negative seconds label.
pub fn time_ago_at(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed_ms = (now - timestamp).num_milliseconds();
    let seconds = (elapsed_ms as f64 / 1000.0).floor();

    for (unit_secs, suffix) in UNITS {
        let interval = seconds / unit_secs;
        if interval > 1.0 {
            return format!("{}{} ago", interval.floor() as i64, suffix);
        }
    }

    format!("{}s ago", seconds as i64)
}

//! Time utilities: calendar-date deadlines measured against an explicit clock.

use anyhow::Result;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Start of `deadline` in the time zone of `now`.
///
/// Falls back to UTC midnight when the local midnight does not exist (DST gap).
pub fn deadline_start<Z: TimeZone>(deadline: NaiveDate, now: &DateTime<Z>) -> DateTime<Utc> {
    let naive = deadline.and_time(NaiveTime::MIN);
    now.timezone()
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Whole days until the deadline, rounded up. Negative for overdue items.
pub fn days_until<Z: TimeZone>(deadline: NaiveDate, now: &DateTime<Z>) -> i64 {
    let start = deadline_start(deadline, now);
    let millis = start
        .signed_duration_since(now.with_timezone(&Utc))
        .num_milliseconds();
    (millis as f64 / MILLIS_PER_DAY).ceil() as i64
}

/// Parse a deadline given as `YYYY-MM-DD`, `today`, `tomorrow` or `+N` days.
pub fn parse_deadline(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let s = input.trim().to_lowercase();
    match s.as_str() {
        "today" => return Ok(today),
        "tomorrow" => {
            return today
                .checked_add_days(Days::new(1))
                .ok_or_else(|| anyhow::anyhow!("deadline out of range"));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix('+') {
        let days: u64 = rest
            .trim_end_matches('d')
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid relative deadline '{input}' (expected +N)"))?;
        return today
            .checked_add_days(Days::new(days))
            .ok_or_else(|| anyhow::anyhow!("deadline out of range"));
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid deadline '{input}': {e} (expected YYYY-MM-DD)"))
}

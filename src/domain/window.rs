// Query time windows and local wall-clock formatting
use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// Wall-clock layout ThingSpeak expects for `start`/`end` parameters.
const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// The 24 hours ending at `now`.
    pub fn last_24h(now: DateTime<Utc>) -> Self {
        Self::new(now - Duration::hours(24), now)
    }

    /// Local midnight of `date` up to the following local midnight in `tz`.
    pub fn for_date(date: NaiveDate, tz: &Tz) -> Self {
        let next = date.succ_opt().unwrap_or(date);
        Self::new(local_midnight(date, tz), local_midnight(next, tz))
    }
}

/// First instant of `date` in `tz`. Zones that skip midnight start the day
/// at the first representable hour after it.
pub fn local_midnight(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let mut naive = date.and_time(chrono::NaiveTime::default());
    for _ in 0..24 {
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                return dt.with_timezone(&Utc);
            }
            LocalResult::None => naive += Duration::hours(1),
        }
    }
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::default()))
}

/// Format an instant as local wall-clock time without a zone marker.
pub fn format_local(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant
        .with_timezone(tz)
        .format(LOCAL_TIMESTAMP_FORMAT)
        .to_string()
}

/// Interpret a zone-less wall-clock timestamp in `tz`.
pub fn parse_local(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let naive = chrono::NaiveDateTime::parse_from_str(raw, LOCAL_TIMESTAMP_FORMAT).ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

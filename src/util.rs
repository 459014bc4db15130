use crate::model::DateRange;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Utc};

/// The active reporting week: local Monday 00:00:00 up to "now".
///
/// Every timestamp is converted with the zone's own rules, so a week that
/// crosses a daylight saving change still buckets commits by wall-clock date.
#[derive(Clone)]
pub struct WeekWindow<Tz: TimeZone = Local> {
    start: DateTime<Tz>,
    now: DateTime<Tz>,
}

impl WeekWindow<Local> {
    pub fn current() -> Self {
        Self::containing(Local::now())
    }
}

impl<Tz: TimeZone> WeekWindow<Tz> {
    pub fn containing(now: DateTime<Tz>) -> Self {
        let zone = now.timezone();
        let days_from_monday = now.weekday().num_days_from_monday() as i64;
        let monday = now.date_naive() - Duration::days(days_from_monday);
        let midnight = monday.and_hms_opt(0, 0, 0).unwrap_or_default();
        // a midnight skipped by a DST jump starts the week an hour later
        let start = zone
            .from_local_datetime(&midnight)
            .earliest()
            .or_else(|| zone.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
            .unwrap_or_else(|| now.clone());
        Self { start, now }
    }

    pub fn monday(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Days from Monday through today, inclusive (1 on Monday, 7 on Sunday).
    pub fn total_days(&self) -> u32 {
        self.now.weekday().number_from_monday()
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        self.range().contains(timestamp)
    }

    /// Calendar date of `timestamp` in the window's time zone.
    pub fn local_date(&self, timestamp: &DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.now.timezone()).date_naive()
    }

    pub fn range(&self) -> DateRange {
        DateRange::new()
            .with_since(self.start.with_timezone(&Utc))
            .with_until(self.now.with_timezone(&Utc))
    }
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Shortest round-trip rendering that always keeps a decimal point (`42.0`, `13.5`).
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

//! Time-window resolution
//!
//! Turns a symbolic window (`TODAY`, `LAST_WEEK`, ...) into concrete
//! timestamp bounds relative to an injected "now". Calendar-day and
//! calendar-month boundaries are evaluated in a fixed UTC offset.

use chrono::{DateTime, FixedOffset, Months, NaiveTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbolic relative time range accepted by ListLogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum TimeWindow {
    /// No bound, every stored entry
    #[default]
    Unspecified,
    /// Since the start of the current calendar day
    Today,
    /// The previous calendar day, half-open
    Yesterday,
    /// The last seven days
    LastWeek,
    /// The last calendar month
    LastMonth,
    /// The last three calendar months
    LastThreeMonths,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 6] = [
        TimeWindow::Unspecified,
        TimeWindow::Today,
        TimeWindow::Yesterday,
        TimeWindow::LastWeek,
        TimeWindow::LastMonth,
        TimeWindow::LastThreeMonths,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::Today => "TODAY",
            Self::Yesterday => "YESTERDAY",
            Self::LastWeek => "LAST_WEEK",
            Self::LastMonth => "LAST_MONTH",
            Self::LastThreeMonths => "LAST_THREE_MONTHS",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Deserialization accepts the same spellings as parsing
impl TryFrom<String> for TimeWindow {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    /// Accepts `LAST_WEEK`, `last_week` and `last-week`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|w| w.as_str() == normalized)
            .ok_or_else(|| format!("unknown time window: {}", s))
    }
}

/// Timestamp bounds: `lower` inclusive, `upper` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeBound {
    pub lower: Option<DateTime<Utc>>,
    pub upper: Option<DateTime<Utc>>,
}

impl TimeBound {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn since(lower: DateTime<Utc>) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }

    pub fn between(lower: DateTime<Utc>, upper: DateTime<Utc>) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.lower.map_or(true, |lower| ts >= lower) && self.upper.map_or(true, |upper| ts < upper)
    }
}

/// Resolve a window to bounds relative to `now`
///
/// `day_offset` is the UTC offset in which "midnight" and "one month ago"
/// are evaluated.
pub fn resolve(window: TimeWindow, now: DateTime<Utc>, day_offset: FixedOffset) -> TimeBound {
    let local_now = now.with_timezone(&day_offset);

    match window {
        TimeWindow::Unspecified => TimeBound::unbounded(),
        TimeWindow::Today => TimeBound::since(start_of_day(local_now)),
        TimeWindow::Yesterday => {
            // Fixed offsets have no DST, every day is 24h long
            let today = start_of_day(local_now);
            TimeBound::between(today - TimeDelta::days(1), today)
        }
        TimeWindow::LastWeek => TimeBound::since(now - TimeDelta::days(7)),
        TimeWindow::LastMonth => TimeBound::since(months_before(local_now, 1)),
        TimeWindow::LastThreeMonths => TimeBound::since(months_before(local_now, 3)),
    }
}

fn start_of_day(local_now: DateTime<FixedOffset>) -> DateTime<Utc> {
    let midnight = local_now.date_naive().and_time(NaiveTime::MIN);
    let offset = TimeDelta::seconds(i64::from(local_now.offset().local_minus_utc()));
    Utc.from_utc_datetime(&(midnight - offset))
}

fn months_before(local_now: DateTime<FixedOffset>, months: u32) -> DateTime<Utc> {
    local_now
        .checked_sub_months(Months::new(months))
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn utc_offset() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_unspecified_has_no_bound() {
        let bound = resolve(TimeWindow::Unspecified, utc(2024, 3, 31, 15, 30), utc_offset());
        assert_eq!(bound, TimeBound::unbounded());
        assert!(bound.contains(DateTime::<Utc>::MIN_UTC));
    }

    #[test]
    fn test_today_starts_at_midnight() {
        let bound = resolve(TimeWindow::Today, utc(2024, 3, 31, 15, 30), utc_offset());
        assert_eq!(bound, TimeBound::since(utc(2024, 3, 31, 0, 0)));
    }

    #[test]
    fn test_yesterday_is_half_open() {
        let bound = resolve(TimeWindow::Yesterday, utc(2024, 3, 31, 15, 30), utc_offset());
        assert_eq!(bound, TimeBound::between(utc(2024, 3, 30, 0, 0), utc(2024, 3, 31, 0, 0)));
        assert!(bound.contains(utc(2024, 3, 30, 0, 0)));
        assert!(!bound.contains(utc(2024, 3, 31, 0, 0)));
    }

    #[test]
    fn test_last_week_is_seven_days() {
        let bound = resolve(TimeWindow::LastWeek, utc(2024, 3, 31, 15, 30), utc_offset());
        assert_eq!(bound, TimeBound::since(utc(2024, 3, 24, 15, 30)));
    }

    #[test]
    fn test_month_arithmetic_clamps_to_month_end() {
        let now = utc(2024, 3, 31, 15, 30);
        assert_eq!(
            resolve(TimeWindow::LastMonth, now, utc_offset()),
            TimeBound::since(utc(2024, 2, 29, 15, 30))
        );
        assert_eq!(
            resolve(TimeWindow::LastThreeMonths, now, utc_offset()),
            TimeBound::since(utc(2023, 12, 31, 15, 30))
        );
    }

    #[test]
    fn test_day_boundary_follows_offset() {
        // 23:30 UTC is already 01:30 the next day at +02:00
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let bound = resolve(TimeWindow::Today, utc(2024, 3, 31, 23, 30), plus_two);
        assert_eq!(bound, TimeBound::since(utc(2024, 3, 31, 22, 0)));

        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        let bound = resolve(TimeWindow::Yesterday, utc(2024, 3, 31, 3, 0), minus_five);
        assert_eq!(bound, TimeBound::between(utc(2024, 3, 29, 5, 0), utc(2024, 3, 30, 5, 0)));
    }

    #[test]
    fn test_lower_bounds_are_nested() {
        let now = utc(2024, 7, 15, 9, 45);
        let lower = |w| resolve(w, now, utc_offset()).lower.unwrap();
        assert!(lower(TimeWindow::Today) >= lower(TimeWindow::LastWeek));
        assert!(lower(TimeWindow::LastWeek) >= lower(TimeWindow::LastMonth));
        assert!(lower(TimeWindow::LastMonth) >= lower(TimeWindow::LastThreeMonths));
    }

    #[test]
    fn test_window_parsing() {
        assert_eq!("LAST_WEEK".parse::<TimeWindow>().unwrap(), TimeWindow::LastWeek);
        assert_eq!("last-three-months".parse::<TimeWindow>().unwrap(), TimeWindow::LastThreeMonths);
        assert_eq!("today".parse::<TimeWindow>().unwrap(), TimeWindow::Today);
        assert!("fortnight".parse::<TimeWindow>().is_err());
    }

    #[test]
    fn test_window_serde_forms() {
        let w: TimeWindow = serde_json::from_str("\"LAST_MONTH\"").unwrap();
        assert_eq!(w, TimeWindow::LastMonth);
        let w: TimeWindow = serde_json::from_str("\"yesterday\"").unwrap();
        assert_eq!(w, TimeWindow::Yesterday);
        let w: TimeWindow = serde_json::from_str("\"last-three-months\"").unwrap();
        assert_eq!(w, TimeWindow::LastThreeMonths);
        assert!(serde_json::from_str::<TimeWindow>("\"fortnight\"").is_err());
        assert_eq!(serde_json::to_string(&TimeWindow::Today).unwrap(), "\"TODAY\"");
    }
}

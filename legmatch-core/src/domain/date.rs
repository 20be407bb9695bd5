//! Calendar dates and duration arithmetic for expiration matching.
//!
//! Dates are plain year/month/day triples with total ordering. One canonical
//! normalization rule applies everywhere: month overflow carries into the
//! year first, then day overflow walks forward month by month using real
//! month lengths (leap years included).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar span unit used by duration constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Day,
    Month,
    Quarter,
    Year,
}

/// A calendar span: `amount` whole periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    pub amount: u32,
    pub period: Period,
}

impl Duration {
    pub fn new(amount: u32, period: Period) -> Self {
        Self { amount, period }
    }

    /// Parses a duration string: an integer amount followed by a unit letter
    /// in {`d`, `m`, `q`, `y`}, e.g. `"3m"`, `"1q"`, `"90d"`.
    pub fn parse(s: &str) -> Option<Duration> {
        let unit = s.chars().last()?;
        let period = match unit {
            'd' => Period::Day,
            'm' => Period::Month,
            'q' => Period::Quarter,
            'y' => Period::Year,
            _ => return None,
        };
        let amount = s[..s.len() - unit.len_utf8()].parse().ok()?;
        Some(Duration { amount, period })
    }
}

/// Calendar date, totally ordered. Month and day are 1-based.
///
/// Derived ordering is lexicographic over (year, month, day), which is
/// exactly calendar order for normalized dates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Date {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl Date {
    /// Builds a date, carrying any month/day overflow through the canonical
    /// normalization pass (`Date::new(2024, 1, 32)` is 2024-02-01).
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        normalize(year as i64, month as i64, day as i64)
    }

    /// The date reached by advancing this one by `dur`.
    pub fn advance(self, dur: Duration) -> Date {
        let n = dur.amount as i64;
        match dur.period {
            Period::Day => normalize(self.year as i64, self.month as i64, self.day as i64 + n),
            Period::Month => self.add_months(n),
            Period::Quarter => self.add_months(3 * n),
            Period::Year => normalize(self.year as i64 + n, self.month as i64, self.day as i64),
        }
    }

    /// Tests whether `target` is reachable from this date by `dur`.
    ///
    /// Day/Month/Year spans are exact: the advanced date must equal `target`.
    /// Quarter spans are a window test: `start = self + 3·amount months`,
    /// `end = self + 3·(amount + 1) months`, and the span matches iff
    /// `start <= target < end`. A quarterly rule accepts any expiration
    /// inside the target quarter, not only one date.
    pub fn matches_span(self, dur: Duration, target: Date) -> bool {
        match dur.period {
            Period::Quarter => {
                let start = self.add_months(3 * dur.amount as i64);
                let end = self.add_months(3 * (dur.amount as i64 + 1));
                start <= target && target < end
            }
            _ => self.advance(dur) == target,
        }
    }

    fn add_months(self, months: i64) -> Date {
        normalize(self.year as i64, self.month as i64 + months, self.day as i64)
    }
}

impl From<NaiveDate> for Date {
    fn from(d: NaiveDate) -> Self {
        Date { year: d.year(), month: d.month(), day: d.day() }
    }
}

/// Canonical normalization: month carries into year, then day overflow
/// walks forward using real month lengths.
fn normalize(year: i64, month: i64, day: i64) -> Date {
    let mut year = year + (month - 1).div_euclid(12);
    let mut month = (month - 1).rem_euclid(12) + 1;
    let mut day = day;
    while day > days_in_month(year, month) {
        day -= days_in_month(year, month);
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    Date { year: year as i32, month: month as u32, day: day as u32 }
}

fn days_in_month(year: i64, month: i64) -> i64 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap(year) => 29,
        _ => 28,
    }
}

fn is_leap(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::new(y, m, d)
    }

    #[test]
    fn ordering_is_calendar_order() {
        assert!(date(2024, 5, 31) < date(2024, 6, 1));
        assert!(date(2024, 12, 31) < date(2025, 1, 1));
        assert!(date(2024, 6, 1) == date(2024, 6, 1));
        assert!(date(2024, 6, 2) > date(2024, 6, 1));
    }

    #[test]
    fn new_normalizes_overflow() {
        assert_eq!(date(2024, 1, 32), date(2024, 2, 1));
        assert_eq!(date(2024, 13, 1), date(2025, 1, 1));
        assert_eq!(date(2023, 12, 32), date(2024, 1, 1));
    }

    #[test]
    fn month_advance_carries_day_overflow() {
        // Jan 31 + 1m lands past the end of February and carries into March.
        let plus_month = Duration::new(1, Period::Month);
        assert_eq!(date(2023, 1, 31).advance(plus_month), date(2023, 3, 3));
        // 2024 is a leap year: February has 29 days.
        assert_eq!(date(2024, 1, 31).advance(plus_month), date(2024, 3, 2));
    }

    #[test]
    fn day_advance_handles_leap_years() {
        let plus_day = Duration::new(1, Period::Day);
        assert_eq!(date(2024, 2, 28).advance(plus_day), date(2024, 2, 29));
        assert_eq!(date(2023, 2, 28).advance(plus_day), date(2023, 3, 1));
        assert_eq!(date(2024, 6, 1).advance(Duration::new(45, Period::Day)), date(2024, 7, 16));
    }

    #[test]
    fn year_advance_normalizes_leap_day() {
        let plus_year = Duration::new(1, Period::Year);
        assert_eq!(date(2024, 2, 29).advance(plus_year), date(2025, 3, 1));
        assert_eq!(date(2024, 6, 21).advance(plus_year), date(2025, 6, 21));
    }

    #[test]
    fn exact_spans_require_exact_dates() {
        let base = date(2024, 6, 1);
        let three_months = Duration::new(3, Period::Month);
        assert!(base.matches_span(three_months, date(2024, 9, 1)));
        assert!(!base.matches_span(three_months, date(2024, 9, 2)));
        assert!(!base.matches_span(three_months, date(2024, 8, 31)));
    }

    #[test]
    fn quarter_spans_are_half_open_windows() {
        let base = date(2024, 1, 15);
        let one_quarter = Duration::new(1, Period::Quarter);
        // Window: [2024-04-15, 2024-07-15)
        assert!(base.matches_span(one_quarter, date(2024, 4, 15)));
        assert!(base.matches_span(one_quarter, date(2024, 5, 31)));
        assert!(base.matches_span(one_quarter, date(2024, 7, 14)));
        assert!(!base.matches_span(one_quarter, date(2024, 7, 15)));
        assert!(!base.matches_span(one_quarter, date(2024, 4, 14)));
    }

    #[test]
    fn zero_quarter_window_covers_the_current_quarter() {
        let base = date(2024, 3, 15);
        let zero_quarters = Duration::new(0, Period::Quarter);
        // Window: [2024-03-15, 2024-06-15)
        assert!(base.matches_span(zero_quarters, date(2024, 3, 15)));
        assert!(base.matches_span(zero_quarters, date(2024, 6, 14)));
        assert!(!base.matches_span(zero_quarters, date(2024, 6, 15)));
    }

    #[test]
    fn duration_parsing() {
        assert_eq!(Duration::parse("3m"), Some(Duration::new(3, Period::Month)));
        assert_eq!(Duration::parse("1q"), Some(Duration::new(1, Period::Quarter)));
        assert_eq!(Duration::parse("90d"), Some(Duration::new(90, Period::Day)));
        assert_eq!(Duration::parse("2y"), Some(Duration::new(2, Period::Year)));
        assert_eq!(Duration::parse(""), None);
        assert_eq!(Duration::parse("m"), None);
        assert_eq!(Duration::parse("3x"), None);
        assert_eq!(Duration::parse("q1"), None);
        assert_eq!(Duration::parse("-3m"), None);
    }

    #[test]
    fn chrono_conversion() {
        let naive = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        assert_eq!(Date::from(naive), date(2024, 6, 21));
    }
}

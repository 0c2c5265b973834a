use crate::error::InputError;
use chirps_utils::dates::{current_year, format_date, is_leap_year, parse_month_day};
use chrono::NaiveDate;
use serde::Serialize;
use std::{fmt, ops::RangeInclusive, str::FromStr};

/// First year covered by the CHIRPS daily collection.
pub const FIRST_CHIRPS_YEAR: i32 = 1981;

/// A month and day without a year, e.g. `03-15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Result<Self, InputError> {
        // 2000 is a leap year, so 02-29 passes
        match NaiveDate::from_ymd_opt(2000, month, day) {
            Some(_) => Ok(MonthDay { month, day }),
            None => Err(InputError::MonthDay(format!("{month:02}-{day:02}"))),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Pin this month-day to `year`. Feb 29 rolls over to Mar 1 outside leap
    /// years, so an exclusive end of `02-29` still keeps Feb 28 in the window.
    pub fn in_year(&self, year: i32) -> NaiveDate {
        let (month, day) = if self.month == 2 && self.day == 29 && !is_leap_year(year) {
            (3, 1)
        } else {
            (self.month, self.day)
        };
        // month and day were validated in `new`
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
    }
}

impl FromStr for MonthDay {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (month, day) =
            parse_month_day(s).map_err(|_| InputError::MonthDay(s.trim().to_string()))?;
        MonthDay::new(month, day)
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// A recurring month-day window applied identically to every year.
///
/// The end is exclusive, so `01-01 -> 12-31` covers Jan 1 through Dec 30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonWindow {
    start: MonthDay,
    end: MonthDay,
}

impl SeasonWindow {
    pub fn new(start: MonthDay, end: MonthDay) -> Result<Self, InputError> {
        if end <= start {
            return Err(InputError::InvalidWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(SeasonWindow { start, end })
    }

    pub fn start(&self) -> MonthDay {
        self.start
    }

    pub fn end(&self) -> MonthDay {
        self.end
    }

    pub fn dates_for(&self, year: i32) -> (NaiveDate, NaiveDate) {
        (self.start.in_year(year), self.end.in_year(year))
    }

    /// The two `YYYY-MM-DD` strings sent to the remote service for `year`.
    pub fn date_strings(&self, year: i32) -> (String, String) {
        let (start, end) = self.dates_for(year);
        (format_date(&start), format_date(&end))
    }
}

impl Default for SeasonWindow {
    fn default() -> Self {
        SeasonWindow {
            start: MonthDay { month: 1, day: 1 },
            end: MonthDay { month: 12, day: 31 },
        }
    }
}

impl fmt::Display for SeasonWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

/// Inclusive range of years to report on. Never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    first: i32,
    last: i32,
}

impl YearRange {
    pub fn new(first: i32, last: i32) -> Result<Self, InputError> {
        if first < FIRST_CHIRPS_YEAR {
            return Err(InputError::YearRange {
                first,
                last,
                reason: format!("CHIRPS starts in {FIRST_CHIRPS_YEAR}"),
            });
        }
        if first > last {
            return Err(InputError::YearRange {
                first,
                last,
                reason: "first year is after last year".to_string(),
            });
        }
        Ok(YearRange { first, last })
    }

    /// 1981 through the current calendar year.
    pub fn through_current_year() -> Self {
        YearRange {
            first: FIRST_CHIRPS_YEAR,
            last: current_year().max(FIRST_CHIRPS_YEAR),
        }
    }

    pub fn first(&self) -> i32 {
        self.first
    }

    pub fn last(&self) -> i32 {
        self.last
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.first..=self.last
    }

    pub fn len(&self) -> usize {
        (self.last - self.first + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for YearRange {
    fn default() -> Self {
        YearRange::through_current_year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_day_parse_and_display() {
        let md: MonthDay = "3-7".parse().unwrap();
        assert_eq!(md, MonthDay { month: 3, day: 7 });
        assert_eq!(md.to_string(), "03-07");
        assert!("02-30".parse::<MonthDay>().is_err());
        assert!("2024-02-29".parse::<MonthDay>().is_ok());
    }

    #[test]
    fn test_date_strings_concatenate_year() {
        let window = SeasonWindow::default();
        let (start, end) = window.date_strings(1981);
        assert_eq!(start, "1981-01-01");
        assert_eq!(end, "1981-12-31");
    }

    #[test]
    fn test_feb_29_outside_leap_year() {
        let window = SeasonWindow::new(
            MonthDay::new(1, 1).unwrap(),
            MonthDay::new(2, 29).unwrap(),
        )
        .unwrap();
        assert_eq!(window.date_strings(2024).1, "2024-02-29");
        assert_eq!(window.date_strings(2023).1, "2023-03-01");
    }

    #[test]
    fn test_single_day_window_before_feb_29() {
        let window = SeasonWindow::new(
            MonthDay::new(2, 28).unwrap(),
            MonthDay::new(2, 29).unwrap(),
        )
        .unwrap();
        for year in [1981, 2023, 2024] {
            let (start, end) = window.dates_for(year);
            assert!(start < end, "empty range in {year}");
            assert_eq!((end - start).num_days(), 1);
        }
    }

    #[test]
    fn test_window_crossing_year_boundary_is_rejected() {
        let result = SeasonWindow::new(
            MonthDay::new(12, 1).unwrap(),
            MonthDay::new(1, 31).unwrap(),
        );
        assert!(matches!(result, Err(InputError::InvalidWindow { .. })));

        let same = MonthDay::new(5, 5).unwrap();
        assert!(SeasonWindow::new(same, same).is_err());
    }

    #[test]
    fn test_year_range() {
        let range = YearRange::new(2019, 2021).unwrap();
        assert_eq!(range.len(), 3);
        assert_eq!(range.years().collect::<Vec<_>>(), vec![2019, 2020, 2021]);
        assert!(YearRange::new(1980, 2000).is_err());
        assert!(YearRange::new(2001, 2000).is_err());
    }

    #[test]
    fn test_year_range_through_current_year() {
        let range = YearRange::through_current_year();
        assert_eq!(range.first(), 1981);
        assert_eq!(range.last(), current_year());
        assert_eq!(range.len(), (current_year() - 1981 + 1) as usize);
    }
}

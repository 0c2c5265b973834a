//! Shared utility functions for CHIRPS crates.

/// Date utility functions
pub mod dates {
    use anyhow::{anyhow, bail};
    use chrono::{Datelike, Local, NaiveDate};

    /// Leap year used to validate month-day fragments so that `02-29` is accepted.
    const REFERENCE_LEAP_YEAR: i32 = 2000;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
    }

    /// Parse a month-day fragment.
    ///
    /// Accepts "MM-DD" or a full "YYYY-MM-DD" date whose year is dropped, which is
    /// what a date picker truncated to month and day hands over.
    pub fn parse_month_day(s: &str) -> anyhow::Result<(u32, u32)> {
        let trimmed = s.trim();
        if let Ok(date) = parse_date(trimmed) {
            return Ok((date.month(), date.day()));
        }
        let (month, day) = trimmed
            .split_once('-')
            .ok_or_else(|| anyhow!("expected MM-DD, got {trimmed:?}"))?;
        let month: u32 = month.parse()?;
        let day: u32 = day.parse()?;
        if NaiveDate::from_ymd_opt(REFERENCE_LEAP_YEAR, month, day).is_none() {
            bail!("{month:02}-{day:02} is not a calendar day");
        }
        Ok((month, day))
    }

    /// The current calendar year in local time.
    pub fn current_year() -> i32 {
        Local::now().date_naive().year()
    }

    pub fn is_leap_year(year: i32) -> bool {
        NaiveDate::from_ymd_opt(year, 2, 29).is_some()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_month_day() {
            assert_eq!(parse_month_day("01-01").unwrap(), (1, 1));
            assert_eq!(parse_month_day("12-31").unwrap(), (12, 31));
            assert_eq!(parse_month_day(" 3-7 ").unwrap(), (3, 7));
            assert_eq!(parse_month_day("02-29").unwrap(), (2, 29));
        }

        #[test]
        fn test_parse_month_day_from_full_date() {
            assert_eq!(parse_month_day("2024-10-15").unwrap(), (10, 15));
        }

        #[test]
        fn test_parse_month_day_rejects_garbage() {
            assert!(parse_month_day("13-01").is_err());
            assert!(parse_month_day("04-31").is_err());
            assert!(parse_month_day("0401").is_err());
            assert!(parse_month_day("aa-bb").is_err());
        }

        #[test]
        fn test_leap_years() {
            assert!(is_leap_year(2024));
            assert!(is_leap_year(2000));
            assert!(!is_leap_year(1900));
            assert!(!is_leap_year(2023));
        }

        #[test]
        fn test_format_and_parse() {
            let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
            let formatted = format_date(&date);
            assert_eq!(formatted, "2023-06-15");
            let parsed = parse_date(&formatted).unwrap();
            assert_eq!(parsed, date);
        }
    }
}

/// Labels used in file names and table cells
pub mod labels {
    /// Render a coordinate the way it appears in export file names.
    ///
    /// Integral values keep a trailing `.0` (`-15.0`), everything else uses the
    /// shortest representation that round-trips (`-15.25`).
    pub fn coordinate_label(value: f64) -> String {
        format!("{value:?}")
    }

}

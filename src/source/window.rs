use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default dashboard horizon in days
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Inclusive-start, exclusive-end run of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlookWindow {
    pub start: NaiveDate,
    pub days: u32,
}

impl OutlookWindow {
    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self { start, days }
    }

    pub fn seven_day(start: NaiveDate) -> Self {
        Self::new(start, DEFAULT_WINDOW_DAYS)
    }

    /// First date past the window
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(i64::from(self.days))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..i64::from(self.days)).map(move |offset| start + Duration::days(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seven_day_window_bounds() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
        let window = OutlookWindow::seven_day(start);

        assert_eq!(window.end(), NaiveDate::from_ymd_opt(2025, 1, 4).unwrap());
        assert!(window.contains(start));
        assert!(window.contains(NaiveDate::from_ymd_opt(2025, 1, 3).unwrap()));
        assert!(!window.contains(window.end()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 12, 27).unwrap()));
        assert_eq!(window.dates().count(), 7);
    }

    #[test]
    fn test_zero_day_window_is_empty() {
        let window = OutlookWindow::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 0);
        assert_eq!(window.dates().count(), 0);
        assert!(!window.contains(window.start));
    }
}

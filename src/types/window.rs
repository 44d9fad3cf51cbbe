use crate::error::ClimatologyError;
use crate::types::traits::any_date::AnyDate;
use crate::types::traits::date_period::DatePeriod;
use chrono::{Days, NaiveDate};
use serde::Serialize;

/// An inclusive, validated span of calendar days (`start <= end`).
///
/// Used both as the reference period of a climate normal and as the query
/// window of an anomaly request.
///
/// # Examples
///
/// ```
/// use climatology::{DateWindow, Year};
///
/// let normal = DateWindow::new(Year(1991), Year(2020))?;
/// assert_eq!(normal.start().to_string(), "1991-01-01");
/// assert_eq!(normal.end().to_string(), "2020-12-31");
///
/// let winter = DateWindow::season(2017)?;
/// assert_eq!(winter.end().to_string(), "2018-06-30");
/// # Ok::<(), climatology::ClimatologyError>(())
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Resolves `start` to the first day it covers and `end` to the last.
    ///
    /// # Errors
    ///
    /// Returns [`ClimatologyError::DateParsingError`] if either bound cannot be
    /// resolved and [`ClimatologyError::InvalidDateRange`] if the window is inverted.
    pub fn new(start: impl AnyDate, end: impl AnyDate) -> Result<Self, ClimatologyError> {
        let start = start
            .get_date_range()
            .ok_or(ClimatologyError::DateParsingError)?
            .start;
        let end = end
            .get_date_range()
            .ok_or(ClimatologyError::DateParsingError)?
            .end;
        if start > end {
            return Err(ClimatologyError::InvalidDateRange {
                start,
                end,
                reason: "start is after end",
            });
        }
        Ok(Self { start, end })
    }

    pub fn for_period(period: impl DatePeriod) -> Result<Self, ClimatologyError> {
        let period = period
            .get_date_period()
            .ok_or(ClimatologyError::DateParsingError)?;
        Self::new(period.start, period.end)
    }

    /// The snow season starting in `year`: Jul 1 of `year` through Jun 30 of the next year.
    pub fn season(year: i32) -> Result<Self, ClimatologyError> {
        let start = NaiveDate::from_ymd_opt(year, 7, 1).ok_or(ClimatologyError::DateParsingError)?;
        let end =
            NaiveDate::from_ymd_opt(year + 1, 6, 30).ok_or(ClimatologyError::DateParsingError)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day of the window in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), |d| d.checked_add_days(Days::new(1)))
            .take_while(move |d| *d <= end)
    }

    /// The same window with its end pulled back to `last`, if `last` falls inside it.
    pub(crate) fn truncated_to(&self, last: NaiveDate) -> Self {
        Self {
            start: self.start,
            end: self.end.min(last).max(self.start),
        }
    }
}

impl Default for DateWindow {
    /// The 1981-2010 climate normal period.
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(1981, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2010, 12, 31).unwrap_or_default(),
        }
    }
}

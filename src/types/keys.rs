//! Keys the aggregated tables are indexed by: a calendar day, a month of a year and
//! a month of any year.

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};

/// A calendar year, resolvable to its first and last day.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Year(pub i32);
impl Year {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl Display for Year {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Calendar position of a day, ignoring the year (`MM-DD`).
///
/// Ordering follows the calendar, so a sorted collection of keys runs from
/// `01-01` to `12-31`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct DayKey {
    month: u32,
    day: u32,
}

impl DayKey {
    pub const LEAP_DAY: DayKey = DayKey { month: 2, day: 29 };

    /// Returns `None` when the month/day pair never occurs, leap years included.
    pub fn new(month: u32, day: u32) -> Option<Self> {
        // 2000 is a leap year, so Feb-29 validates.
        NaiveDate::from_ymd_opt(2000, month, day).map(|_| Self { month, day })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn day(self) -> u32 {
        self.day
    }

    pub fn is_leap_day(self) -> bool {
        self == Self::LEAP_DAY
    }

    /// All 365 keys of a common year in calendar order.
    pub fn common_year() -> impl Iterator<Item = DayKey> {
        (0..365u64).filter_map(|offset| {
            NaiveDate::from_ymd_opt(2001, 1, 1)
                .and_then(|start| start.checked_add_days(chrono::Days::new(offset)))
                .map(DayKey::from_date)
        })
    }
}

impl Display for DayKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A specific month of a specific year (`YYYY-MM`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct MonthKey(pub i32, pub u32);
impl MonthKey {
    pub fn year(self) -> i32 {
        self.0
    }
    pub fn month(self) -> u32 {
        self.1
    }
    /// Takes the month first, then the year.
    /// The month is not validated; [`MonthKey::calendar_month`] is `None` for values
    /// outside 1-12.
    pub fn new(month: u32, year: i32) -> Self {
        Self(year, month)
    }
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.year(), date.month())
    }
    /// Drops the year.
    pub fn calendar_month(self) -> Option<CalendarMonth> {
        CalendarMonth::new(self.1)
    }

    /// The following month, `None` past the last representable year.
    pub(crate) fn next(self) -> Option<Self> {
        if self.1 >= 12 {
            Some(Self(self.0.checked_add(1)?, 1))
        } else {
            Some(Self(self.0, self.1 + 1))
        }
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0, self.1)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Month of the year (1-12), used to collapse monthly data across years.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize)]
pub struct CalendarMonth(u32);
impl CalendarMonth {
    /// Returns `None` outside 1-12.
    pub fn new(month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self(month))
    }
    pub fn get(self) -> u32 {
        self.0
    }
    /// January to December.
    pub fn all() -> impl Iterator<Item = CalendarMonth> {
        (1..=12).map(CalendarMonth)
    }
}

impl Display for CalendarMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

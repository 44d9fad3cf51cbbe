use crate::types::keys::{MonthKey, Year};
use chrono::NaiveDate;

pub struct StartEndDate {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Anything that resolves to an inclusive span of calendar days.
///
/// A single `NaiveDate` (or a `"YYYY-MM-DD"` string) resolves to that one day,
/// a [`Year`] to Jan 1 through Dec 31 and a [`MonthKey`] to its first and last day.
pub trait AnyDate {
    fn get_date_range(self) -> Option<StartEndDate>;
}

impl AnyDate for NaiveDate {
    fn get_date_range(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: self,
            end: self,
        })
    }
}

impl AnyDate for &str {
    fn get_date_range(self) -> Option<StartEndDate> {
        NaiveDate::parse_from_str(self.trim(), "%Y-%m-%d")
            .ok()?
            .get_date_range()
    }
}

impl AnyDate for String {
    fn get_date_range(self) -> Option<StartEndDate> {
        self.as_str().get_date_range()
    }
}

impl AnyDate for Year {
    fn get_date_range(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: NaiveDate::from_ymd_opt(self.0, 1, 1)?,
            end: NaiveDate::from_ymd_opt(self.0, 12, 31)?,
        })
    }
}

impl AnyDate for MonthKey {
    fn get_date_range(self) -> Option<StartEndDate> {
        let next = self.next()?;
        Some(StartEndDate {
            start: NaiveDate::from_ymd_opt(self.year(), self.month(), 1)?,
            end: NaiveDate::from_ymd_opt(next.year(), next.month(), 1)?.pred_opt()?,
        })
    }
}

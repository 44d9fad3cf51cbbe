use crate::types::keys::{MonthKey, Year};
use crate::types::traits::any_date::{AnyDate, StartEndDate};

/// A named period that covers a whole span of days, such as a year or a month.
pub trait DatePeriod {
    fn get_date_period(self) -> Option<StartEndDate>;
}

impl DatePeriod for Year {
    fn get_date_period(self) -> Option<StartEndDate> {
        self.get_date_range()
    }
}

impl DatePeriod for MonthKey {
    fn get_date_period(self) -> Option<StartEndDate> {
        self.get_date_range()
    }
}

impl DatePeriod for (Year, Year) {
    fn get_date_period(self) -> Option<StartEndDate> {
        Some(StartEndDate {
            start: self.0.get_date_range()?.start,
            end: self.1.get_date_range()?.end,
        })
    }
}

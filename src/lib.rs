mod aggregate;
mod anomaly;
mod climatology;
mod error;
mod normals;
mod types;

#[cfg(test)]
mod test_utils;

pub use climatology::*;
pub use error::ClimatologyError;

pub use aggregate::day_of_year::DayOfYearAggregator;
pub use aggregate::month::MonthAggregator;

pub use normals::daily::{impute_leap_day, ClimateNormalBuilder, DEFAULT_SMOOTHING_WINDOW};
pub use normals::monthly::MonthlyNormalBuilder;
pub use normals::smoothing::{circular_moving_average, smooth_baseline};

pub use anomaly::trailing::trailing_mean;
pub use anomaly::{
    AnomalyCalculator, BaselinePoint, DailyRow, DailySeries, MonthlyQuantity, MonthlyRow,
    MonthlySeries, TrailingBasis,
};

pub use types::keys::{CalendarMonth, DayKey, MonthKey, Year};
pub use types::observation::{Observation, Quantities, Quantity};
pub use types::observation_set::ObservationSet;
pub use types::tables::*;
pub use types::traits::any_date::AnyDate;
pub use types::traits::date_period::DatePeriod;
pub use types::window::DateWindow;

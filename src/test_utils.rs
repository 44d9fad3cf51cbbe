// Synthetic observation series shared by unit tests.

use crate::types::observation::Observation;
use crate::types::observation_set::ObservationSet;
use chrono::{Days, NaiveDate};

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// An observation whose min and max equal `tmean`, so the derived mean is exact.
pub(crate) fn observation(date: NaiveDate, tmean: f64) -> Observation {
    Observation::builder()
        .date(date)
        .station("TEST0001")
        .name("TEST STATION")
        .tmin(tmean)
        .tmax(tmean)
        .precipitation(0.0)
        .build()
}

pub(crate) fn every_day(first_year: i32, last_year: i32) -> impl Iterator<Item = NaiveDate> {
    let end = date(last_year, 12, 31);
    std::iter::successors(Some(date(first_year, 1, 1)), |d| {
        d.checked_add_days(Days::new(1))
    })
    .take_while(move |d| *d <= end)
}

/// Every day of `first_year..=last_year` built by `make`.
pub(crate) fn synthetic_set_with(
    first_year: i32,
    last_year: i32,
    make: impl Fn(NaiveDate) -> Observation,
) -> ObservationSet {
    ObservationSet::new(every_day(first_year, last_year).map(make).collect()).unwrap()
}

/// Every day of `first_year..=last_year` with mean temperature `tmean(date)` and no precipitation.
pub(crate) fn synthetic_set(
    first_year: i32,
    last_year: i32,
    tmean: impl Fn(NaiveDate) -> f64,
) -> ObservationSet {
    synthetic_set_with(first_year, last_year, |d| observation(d, tmean(d)))
}

//! Contains the `ObservationSet` structure, the date-indexed container every
//! aggregation and baseline in this crate is computed from.

use crate::error::ClimatologyError;
use crate::types::observation::{Observation, Quantities};
use crate::types::traits::any_date::AnyDate;
use crate::types::traits::date_period::DatePeriod;
use crate::types::window::DateWindow;
use chrono::{Datelike, NaiveDate};
use polars::prelude::{df, DataFrame, IntoLazy, LazyFrame, PolarsResult};
use std::collections::BTreeSet;

/// Daily observations of a single location, sorted by date with at most one record per day.
///
/// Gaps between dates are missing days, not zeros. The set carries a [`Quantities`]
/// descriptor telling which columns the data source provides; subsets created by the
/// slicing methods inherit it unchanged.
///
/// # Example
///
/// ```
/// use climatology::{Observation, ObservationSet, Quantities, Year};
/// use chrono::NaiveDate;
///
/// let obs = (1..=31)
///     .map(|d| {
///         Observation::builder()
///             .date(NaiveDate::from_ymd_opt(2020, 1, d).unwrap())
///             .tmin(-5.0)
///             .tmax(1.0)
///             .precipitation(0.5)
///             .build()
///     })
///     .collect();
/// let set = ObservationSet::new(obs)?;
/// assert_eq!(set.len(), 31);
/// assert!(set.quantities().contains(Quantities::TEMPERATURE));
/// assert!(!set.quantities().contains(Quantities::SNOWFALL));
///
/// let week = set.get_range("2020-01-01", "2020-01-07")?;
/// assert_eq!(week.len(), 7);
/// # Ok::<(), climatology::ClimatologyError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    observations: Vec<Observation>,
    quantities: Quantities,
}

impl ObservationSet {
    /// Builds a set and infers its quantities from the values present.
    ///
    /// # Errors
    ///
    /// Returns [`ClimatologyError::DuplicateDate`] if two records share a date.
    pub fn new(observations: Vec<Observation>) -> Result<Self, ClimatologyError> {
        let quantities = Quantities::detect(&observations);
        Self::with_quantities(observations, quantities)
    }

    /// Builds a set whose available quantities are known from the source schema.
    pub fn with_quantities(
        mut observations: Vec<Observation>,
        quantities: Quantities,
    ) -> Result<Self, ClimatologyError> {
        observations.sort_by_key(|o| o.date());
        if let Some(pair) = observations.windows(2).find(|w| w[0].date() == w[1].date()) {
            return Err(ClimatologyError::DuplicateDate(pair[0].date()));
        }
        Ok(Self {
            observations,
            quantities,
        })
    }

    fn subset(&self, observations: Vec<Observation>) -> Self {
        Self {
            observations,
            quantities: self.quantities,
        }
    }

    /// Quantities the source provides, whether or not any value is present.
    pub fn quantities(&self) -> Quantities {
        self.quantities
    }

    /// The records in date order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(Observation::date)
    }

    /// Date of the latest record. Queries are truncated here.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(Observation::date)
    }

    /// Keeps the observations matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&Observation) -> bool) -> ObservationSet {
        self.subset(
            self.observations
                .iter()
                .filter(|o| predicate(o))
                .cloned()
                .collect(),
        )
    }

    /// Observations inside `window`, bounds included.
    pub fn within(&self, window: &DateWindow) -> ObservationSet {
        let from = self
            .observations
            .partition_point(|o| o.date() < window.start());
        let to = self
            .observations
            .partition_point(|o| o.date() <= window.end());
        self.subset(self.observations[from..to.max(from)].to_vec())
    }

    /// Observations from the first day of `start` to the last day of `end`, inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`ClimatologyError::DateParsingError`] if a bound cannot be resolved and
    /// [`ClimatologyError::InvalidDateRange`] if the range is inverted.
    pub fn get_range(
        &self,
        start: impl AnyDate,
        end: impl AnyDate,
    ) -> Result<ObservationSet, ClimatologyError> {
        Ok(self.within(&DateWindow::new(start, end)?))
    }

    /// The record for one day, if there is one. For ranges the first day is used.
    pub fn get_at(&self, date: impl AnyDate) -> Result<Option<&Observation>, ClimatologyError> {
        let day = date
            .get_date_range()
            .ok_or(ClimatologyError::DateParsingError)?
            .start;
        Ok(self
            .observations
            .binary_search_by_key(&day, Observation::date)
            .ok()
            .map(|idx| &self.observations[idx]))
    }

    /// Observations of a whole period, e.g. a [`crate::Year`] or a [`crate::MonthKey`].
    ///
    /// # Arguments
    ///
    /// * `period` - Anything implementing [`DatePeriod`], resolved to its first and
    ///   last day.
    ///
    /// # Returns
    ///
    /// A `Result` holding the observations of the period, possibly empty, or a
    /// [`ClimatologyError::DateParsingError`] if the period has no valid date span.
    pub fn get_for_period(
        &self,
        period: impl DatePeriod,
    ) -> Result<ObservationSet, ClimatologyError> {
        Ok(self.within(&DateWindow::for_period(period)?))
    }

    /// Drops every Feb-29 record.
    pub fn without_leap_days(&self) -> ObservationSet {
        self.filter(|o| !(o.date().month() == 2 && o.date().day() == 29))
    }

    /// Keeps records whose location name contains `location`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`ClimatologyError::InvalidLocation`] if no record matches.
    pub fn for_location(&self, location: &str) -> Result<ObservationSet, ClimatologyError> {
        let needle = location.to_lowercase();
        let matching = self.filter(|o| o.name().to_lowercase().contains(&needle));
        if matching.is_empty() {
            return Err(ClimatologyError::InvalidLocation(location.to_string()));
        }
        Ok(matching)
    }

    /// Distinct location names in the set, sorted.
    pub fn locations(&self) -> Vec<&str> {
        self.observations
            .iter()
            .map(Observation::name)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Materializes the set as a `DataFrame` with `date`, calendar parts and one
    /// nullable `f64` column per quantity.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let obs = &self.observations;
        let dates: Vec<NaiveDate> = obs.iter().map(Observation::date).collect();
        let years: Vec<i64> = dates.iter().map(|d| i64::from(d.year())).collect();
        let months: Vec<i64> = dates.iter().map(|d| i64::from(d.month())).collect();
        let days: Vec<i64> = dates.iter().map(|d| i64::from(d.day())).collect();
        let tmin: Vec<Option<f64>> = obs.iter().map(Observation::tmin).collect();
        let tmax: Vec<Option<f64>> = obs.iter().map(Observation::tmax).collect();
        let tmean: Vec<Option<f64>> = obs.iter().map(Observation::tmean).collect();
        let prcp: Vec<Option<f64>> = obs.iter().map(Observation::precipitation).collect();
        let snow: Vec<Option<f64>> = obs.iter().map(Observation::snowfall).collect();

        df!(
            "date" => dates,
            "year" => years,
            "month" => months,
            "day" => days,
            "tmin" => tmin,
            "tmax" => tmax,
            "tmean" => tmean,
            "prcp" => prcp,
            "snow" => snow,
        )
    }

    /// [`ObservationSet::to_frame`] as a `LazyFrame`, the input of the group-and-reduce
    /// aggregations.
    pub fn lazy(&self) -> PolarsResult<LazyFrame> {
        Ok(self.to_frame()?.lazy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, observation, synthetic_set};
    use crate::types::keys::{MonthKey, Year};
    use crate::types::observation::Quantity;

    #[test]
    fn test_new_sorts_by_date() -> Result<(), Box<dyn std::error::Error>> {
        let set = ObservationSet::new(vec![
            observation(date(2020, 1, 3), 1.0),
            observation(date(2020, 1, 1), 2.0),
            observation(date(2020, 1, 2), 3.0),
        ])?;
        let dates: Vec<NaiveDate> = set.iter().map(Observation::date).collect();
        assert_eq!(dates, vec![date(2020, 1, 1), date(2020, 1, 2), date(2020, 1, 3)]);
        assert_eq!(set.first_date(), Some(date(2020, 1, 1)));
        assert_eq!(set.last_date(), Some(date(2020, 1, 3)));
        Ok(())
    }

    #[test]
    fn test_duplicate_dates_are_rejected() {
        let result = ObservationSet::new(vec![
            observation(date(2020, 1, 1), 1.0),
            observation(date(2020, 1, 1), 2.0),
        ]);
        assert!(matches!(result, Err(ClimatologyError::DuplicateDate(d)) if d == date(2020, 1, 1)));
    }

    #[test]
    fn test_get_range_is_inclusive() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2020, 2020, |_| 0.0);
        let march = set.get_range("2020-03-01", "2020-03-31")?;
        assert_eq!(march.len(), 31);
        assert_eq!(march.quantities(), set.quantities());

        let february = set.get_for_period(MonthKey::new(2, 2020))?;
        assert_eq!(february.len(), 29);

        let year = set.get_for_period(Year(2020))?;
        assert_eq!(year.len(), 366);
        Ok(())
    }

    #[test]
    fn test_get_range_outside_data_is_empty() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2020, 2020, |_| 0.0);
        assert!(set.get_range("2200-01-01", "2200-01-07")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_get_at() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2020, 2020, |d| f64::from(d.ordinal()));
        let obs = set.get_at("2020-02-01")?.expect("date is present");
        assert_eq!(obs.tmean(), Some(32.0));
        assert!(set.get_at("2021-02-01")?.is_none());
        Ok(())
    }

    #[test]
    fn test_without_leap_days() {
        let set = synthetic_set(2019, 2020, |_| 0.0);
        let trimmed = set.without_leap_days();
        assert_eq!(trimmed.len(), set.len() - 1);
        assert!(trimmed.iter().all(|o| !(o.date().month() == 2 && o.date().day() == 29)));
    }

    #[test]
    fn test_for_location_is_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
        let set = ObservationSet::new(vec![
            Observation::builder()
                .date(date(2020, 1, 1))
                .name("KOTZEBUE RALPH WIEN MEMORIAL AIRPORT, AK US")
                .tmin(-30.0)
                .tmax(-20.0)
                .build(),
            Observation::builder()
                .date(date(2020, 1, 2))
                .name("NOME MUNICIPAL AIRPORT, AK US")
                .tmin(-20.0)
                .tmax(-10.0)
                .build(),
        ])?;
        assert_eq!(set.locations().len(), 2);
        assert_eq!(set.for_location("kotzebue")?.len(), 1);
        assert!(matches!(
            set.for_location("Barrow"),
            Err(ClimatologyError::InvalidLocation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_explicit_quantities_survive_slicing() -> Result<(), Box<dyn std::error::Error>> {
        let set = ObservationSet::with_quantities(
            vec![observation(date(2020, 1, 1), 1.0)],
            Quantities::TEMPERATURE | Quantities::SNOWFALL,
        )?;
        let slice = set.get_range("2020-01-01", "2020-01-01")?;
        assert!(slice.quantities().has(Quantity::Snowfall));
        assert!(!slice.quantities().has(Quantity::Precipitation));
        Ok(())
    }

    #[test]
    fn test_to_frame_schema() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2020, 2020, |_| 1.0);
        let frame = set.to_frame()?;
        assert_eq!(frame.height(), 366);
        for name in ["date", "year", "month", "day", "tmin", "tmax", "tmean", "prcp", "snow"] {
            assert!(frame.column(name).is_ok(), "missing column {name}");
        }
        Ok(())
    }
}

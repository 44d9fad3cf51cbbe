//! Output tables: ordered key-to-record mappings with no behavior beyond lookup and
//! conversion to `DataFrame`s for presentation.

use crate::aggregate::group_reduce::ReducedRow;
use crate::types::keys::{CalendarMonth, DayKey, MonthKey};
use polars::prelude::{Column, DataFrame, NamedFrom, PolarsResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Descriptive statistics of one group of days.
///
/// Every figure is optional: a group whose values are all missing, or a standard
/// deviation over fewer than two samples, yields `None`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub tmean_mean: Option<f64>,
    pub tmean_std: Option<f64>,
    pub tmean_max: Option<f64>,
    pub tmean_min: Option<f64>,
    pub tmax_max: Option<f64>,
    pub tmax_std: Option<f64>,
    pub tmin_min: Option<f64>,
    pub tmin_std: Option<f64>,
    pub snow_mean: Option<f64>,
}

impl SummaryStats {
    pub(crate) const COLUMNS: [&'static str; 9] = [
        "tmean_mean",
        "tmean_std",
        "tmean_max",
        "tmean_min",
        "tmax_max",
        "tmax_std",
        "tmin_min",
        "tmin_std",
        "snow_mean",
    ];

    pub(crate) fn to_array(self) -> [Option<f64>; 9] {
        [
            self.tmean_mean,
            self.tmean_std,
            self.tmean_max,
            self.tmean_min,
            self.tmax_max,
            self.tmax_std,
            self.tmin_min,
            self.tmin_std,
            self.snow_mean,
        ]
    }

    pub(crate) fn from_array(values: [Option<f64>; 9]) -> Self {
        let [tmean_mean, tmean_std, tmean_max, tmean_min, tmax_max, tmax_std, tmin_min, tmin_std, snow_mean] =
            values;
        Self {
            tmean_mean,
            tmean_std,
            tmean_max,
            tmean_min,
            tmax_max,
            tmax_std,
            tmin_min,
            tmin_std,
            snow_mean,
        }
    }

    pub(crate) fn from_row(row: &ReducedRow) -> Self {
        Self::from_array(Self::COLUMNS.map(|name| row.get(name)))
    }

    /// Combines several records field by field.
    pub(crate) fn zip_with(
        records: &[SummaryStats],
        combine: impl Fn(&[Option<f64>]) -> Option<f64>,
    ) -> Self {
        let arrays: Vec<[Option<f64>; 9]> = records.iter().map(|r| r.to_array()).collect();
        let mut column = Vec::with_capacity(arrays.len());
        let values = std::array::from_fn(|field| {
            column.clear();
            column.extend(arrays.iter().map(|a| a[field]));
            combine(&column)
        });
        Self::from_array(values)
    }

    /// Mean daily temperature plus one standard deviation.
    pub fn tmean_upper(&self) -> Option<f64> {
        Some(self.tmean_mean? + self.tmean_std?)
    }

    /// Mean daily temperature minus one standard deviation.
    pub fn tmean_lower(&self) -> Option<f64> {
        Some(self.tmean_mean? - self.tmean_std?)
    }
}

fn summary_columns<'a>(records: impl Iterator<Item = &'a SummaryStats>) -> Vec<Column> {
    let arrays: Vec<[Option<f64>; 9]> = records.map(|r| r.to_array()).collect();
    SummaryStats::COLUMNS
        .iter()
        .enumerate()
        .map(|(field, name)| {
            let values: Vec<Option<f64>> = arrays.iter().map(|a| a[field]).collect();
            Column::new((*name).into(), values)
        })
        .collect()
}

/// Day-of-year climatology keyed by [`DayKey`].
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DailyBaseline {
    entries: BTreeMap<DayKey, SummaryStats>,
}

impl DailyBaseline {
    /// Wraps an already keyed table. Keys keep their calendar order regardless of
    /// insertion order.
    pub fn new(entries: BTreeMap<DayKey, SummaryStats>) -> Self {
        Self { entries }
    }

    /// Looks up the statistics of one calendar day.
    ///
    /// # Arguments
    ///
    /// * `key` - The calendar day, e.g. `DayKey::LEAP_DAY`.
    ///
    /// # Returns
    ///
    /// * `Some(&SummaryStats)` if the day is part of the baseline. A day present with
    ///   no data holds an all-`None` record rather than being absent.
    /// * `None` if the day was never added, such as Feb 29 when imputation is off.
    pub fn get(&self, key: DayKey) -> Option<&SummaryStats> {
        self.entries.get(&key)
    }

    /// Number of calendar days, 365 or 366 for a finished baseline.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: DayKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Entries in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = (&DayKey, &SummaryStats)> {
        self.entries.iter()
    }

    pub(crate) fn insert(&mut self, key: DayKey, stats: SummaryStats) {
        self.entries.insert(key, stats);
    }

    pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<DayKey, SummaryStats> {
        &mut self.entries
    }

    /// Converts the baseline to a [`DataFrame`] for presentation.
    ///
    /// # Returns
    ///
    /// One row per calendar day in calendar order: a `day_key` string column (`MM-DD`)
    /// followed by one nullable `Float64` column per [`SummaryStats`] field.
    ///
    /// # Errors
    ///
    /// Returns a [`polars::error::PolarsError`] if the frame cannot be assembled.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let keys: Vec<String> = self.entries.keys().map(ToString::to_string).collect();
        let mut columns = vec![Column::new("day_key".into(), keys)];
        columns.extend(summary_columns(self.entries.values()));
        DataFrame::new(columns)
    }
}

/// Statistics of one month of one year.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyStats {
    #[serde(flatten)]
    pub summary: SummaryStats,
    /// Accumulated precipitation of the observed days.
    pub precipitation: Option<f64>,
    /// Days with a mean temperature.
    pub days: u32,
}

/// Per-month statistics of a series, keyed by [`MonthKey`].
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MonthlyAggregate {
    entries: BTreeMap<MonthKey, MonthlyStats>,
}

impl MonthlyAggregate {
    pub fn new(entries: BTreeMap<MonthKey, MonthlyStats>) -> Self {
        Self { entries }
    }

    /// Statistics of one month of one year, `None` when the series has no day in it.
    pub fn get(&self, key: MonthKey) -> Option<&MonthlyStats> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Months in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (&MonthKey, &MonthlyStats)> {
        self.entries.iter()
    }

    /// Distinct years with at least one month present.
    pub fn year_count(&self) -> usize {
        let mut years: Vec<i32> = self.entries.keys().map(|k| k.year()).collect();
        years.dedup();
        years.len()
    }

    /// Converts the aggregate to a [`DataFrame`].
    ///
    /// # Returns
    ///
    /// One row per month with integer `year` and `month` columns, the
    /// [`SummaryStats`] columns, the nullable `prcp_sum` total and the `days` count.
    /// This is the frame the monthly normals are collapsed from.
    ///
    /// # Errors
    ///
    /// Returns a [`polars::error::PolarsError`] if the frame cannot be assembled.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let years: Vec<i64> = self.entries.keys().map(|k| i64::from(k.year())).collect();
        let months: Vec<i64> = self.entries.keys().map(|k| i64::from(k.month())).collect();
        let prcp: Vec<Option<f64>> = self.entries.values().map(|s| s.precipitation).collect();
        let days: Vec<u32> = self.entries.values().map(|s| s.days).collect();

        let mut columns = vec![
            Column::new("year".into(), years),
            Column::new("month".into(), months),
        ];
        columns.extend(summary_columns(self.entries.values().map(|s| &s.summary)));
        columns.push(Column::new("prcp_sum".into(), prcp));
        columns.push(Column::new("days".into(), days));
        DataFrame::new(columns)
    }
}

/// Climatology of one calendar month over a reference period.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyNormal {
    #[serde(flatten)]
    pub summary: SummaryStats,
    /// Cross-year mean of the monthly totals multiplied by [`MonthlyNormal::years`].
    pub precipitation: Option<f64>,
    /// Distinct reference years the normal was built from.
    pub years: u32,
}

/// Twelve calendar-month normals keyed by [`CalendarMonth`].
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MonthlyBaseline {
    entries: BTreeMap<CalendarMonth, MonthlyNormal>,
}

impl MonthlyBaseline {
    pub fn new(entries: BTreeMap<CalendarMonth, MonthlyNormal>) -> Self {
        Self { entries }
    }

    /// Looks up the normal of one calendar month.
    ///
    /// # Returns
    ///
    /// * `Some(&MonthlyNormal)` if the reference slice covered the month in at least one year.
    /// * `None` otherwise.
    pub fn get(&self, month: CalendarMonth) -> Option<&MonthlyNormal> {
        self.entries.get(&month)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normals from January to December.
    pub fn iter(&self) -> impl Iterator<Item = (&CalendarMonth, &MonthlyNormal)> {
        self.entries.iter()
    }

    /// One row per calendar month: `month`, the [`SummaryStats`] columns, the scaled
    /// `prcp` normal and the `years` it was scaled by.
    ///
    /// # Errors
    ///
    /// Returns a [`polars::error::PolarsError`] if the frame cannot be assembled.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let months: Vec<i64> = self.entries.keys().map(|m| i64::from(m.get())).collect();
        let prcp: Vec<Option<f64>> = self.entries.values().map(|n| n.precipitation).collect();
        let years: Vec<u32> = self.entries.values().map(|n| n.years).collect();

        let mut columns = vec![Column::new("month".into(), months)];
        columns.extend(summary_columns(self.entries.values().map(|n| &n.summary)));
        columns.push(Column::new("prcp".into(), prcp));
        columns.push(Column::new("years".into(), years));
        DataFrame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean: f64, std: f64) -> SummaryStats {
        SummaryStats {
            tmean_mean: Some(mean),
            tmean_std: Some(std),
            ..Default::default()
        }
    }

    #[test]
    fn test_std_band_brackets_mean() {
        let s = stats(4.0, 1.5);
        assert_eq!(s.tmean_upper(), Some(5.5));
        assert_eq!(s.tmean_lower(), Some(2.5));
        assert_eq!(SummaryStats::default().tmean_upper(), None);
    }

    #[test]
    fn test_array_round_trip_keeps_field_order() {
        let s = SummaryStats {
            tmean_mean: Some(1.0),
            tmax_std: Some(6.0),
            snow_mean: Some(9.0),
            ..Default::default()
        };
        let array = s.to_array();
        assert_eq!(array[0], Some(1.0));
        assert_eq!(array[5], Some(6.0));
        assert_eq!(array[8], Some(9.0));
        assert_eq!(SummaryStats::from_array(array), s);
    }

    #[test]
    fn test_zip_with_combines_each_field() {
        let combined = SummaryStats::zip_with(&[stats(1.0, 2.0), stats(3.0, 4.0)], |v| {
            v.iter().copied().sum::<Option<f64>>()
        });
        assert_eq!(combined.tmean_mean, Some(4.0));
        assert_eq!(combined.tmean_std, Some(6.0));
        assert_eq!(combined.tmax_max, None);
    }

    #[test]
    fn test_daily_baseline_frame() -> Result<(), Box<dyn std::error::Error>> {
        let mut entries = BTreeMap::new();
        entries.insert(DayKey::new(1, 2).unwrap(), stats(1.0, 0.5));
        entries.insert(DayKey::new(1, 1).unwrap(), stats(0.0, 0.5));
        let frame = DailyBaseline::new(entries).to_frame()?;
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.width(), 10);
        let keys = frame.column("day_key")?.str()?;
        assert_eq!(keys.get(0), Some("01-01"));
        Ok(())
    }

    #[test]
    fn test_serialized_keys_are_labels() -> Result<(), Box<dyn std::error::Error>> {
        let mut entries = BTreeMap::new();
        entries.insert(DayKey::new(12, 31).unwrap(), stats(1.0, 0.5));
        let json = serde_json::to_value(DailyBaseline::new(entries))?;
        assert!(json["entries"]["12-31"]["tmean_mean"].is_number());
        Ok(())
    }

    #[test]
    fn test_year_count() {
        let mut entries = BTreeMap::new();
        for (year, month) in [(2000, 1), (2000, 2), (2001, 1), (2003, 12)] {
            entries.insert(MonthKey::new(month, year), MonthlyStats::default());
        }
        assert_eq!(MonthlyAggregate::new(entries).year_count(), 3);
    }
}

//! Daily anomaly rows: observed mean temperature against the smoothed day-of-year
//! baseline, with record markers and optional snow accumulation.

use crate::error::ClimatologyError;
use crate::types::keys::DayKey;
use crate::types::observation::Observation;
use crate::types::observation_set::ObservationSet;
use crate::types::tables::{DailyBaseline, SummaryStats};
use crate::types::window::DateWindow;
use chrono::NaiveDate;
use polars::prelude::{df, DataFrame, PolarsResult};
use serde::Serialize;

/// One day of a daily anomaly query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub day_key: DayKey,
    /// Observed mean temperature.
    pub observed: Option<f64>,
    pub baseline_mean: Option<f64>,
    /// Baseline mean plus one standard deviation.
    pub baseline_upper: Option<f64>,
    /// Baseline mean minus one standard deviation.
    pub baseline_lower: Option<f64>,
    pub anomaly: Option<f64>,
    /// The observation is the warmest on record for its calendar day.
    pub record_high: bool,
    /// The observation is the coldest on record for its calendar day.
    pub record_low: bool,
    pub precipitation: Option<f64>,
    pub snowfall: Option<f64>,
    /// Snowfall accumulated since the start of the window, if requested.
    pub snow_accumulation: Option<f64>,
}

/// The baseline band at one date of the query window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaselinePoint {
    pub date: NaiveDate,
    pub day_key: DayKey,
    pub mean: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}

impl BaselinePoint {
    fn new(date: NaiveDate, stats: Option<&SummaryStats>) -> Self {
        Self {
            date,
            day_key: DayKey::from_date(date),
            mean: stats.and_then(|s| s.tmean_mean),
            upper: stats.and_then(SummaryStats::tmean_upper),
            lower: stats.and_then(SummaryStats::tmean_lower),
        }
    }
}

/// Result of a daily query.
///
/// `rows` stop at the latest observation, while `climatology` spans the whole
/// requested window so the baseline can be drawn ahead of the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    window: DateWindow,
    rows: Vec<DailyRow>,
    climatology: Vec<BaselinePoint>,
    last_snow: Option<NaiveDate>,
}

impl DailySeries {
    /// The window as requested, before truncation.
    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    /// Rows in date order, from the window start to the latest observation.
    pub fn rows(&self) -> &[DailyRow] {
        &self.rows
    }

    /// The baseline band for every date of the requested window.
    ///
    /// # Returns
    ///
    /// One [`BaselinePoint`] per day from the window start to its end, also past the
    /// latest observation. Points on a day the baseline lacks carry `None` values.
    pub fn climatology(&self) -> &[BaselinePoint] {
        &self.climatology
    }

    /// Latest date in the rows with snowfall above zero.
    pub fn last_snow(&self) -> Option<NaiveDate> {
        self.last_snow
    }

    /// Number of rows, not the length of the requested window.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose observation matches or beats the warmest value on record for its
    /// calendar day.
    pub fn records_high(&self) -> impl Iterator<Item = &DailyRow> {
        self.rows.iter().filter(|r| r.record_high)
    }

    /// Rows at or below the coldest value on record for their calendar day.
    pub fn records_low(&self) -> impl Iterator<Item = &DailyRow> {
        self.rows.iter().filter(|r| r.record_low)
    }

    /// Converts the rows to a [`DataFrame`].
    ///
    /// # Returns
    ///
    /// One row per [`DailyRow`] with a `date` column and the `day_key` label. The
    /// observed mean is in `tmean` and the baseline band in `baseline_mean`,
    /// `baseline_upper` and `baseline_lower`. The remaining columns are `anomaly`,
    /// the boolean `record_high`/`record_low` flags, `prcp`, `snow` and
    /// `snow_accumulation`.
    ///
    /// # Errors
    ///
    /// Returns a [`polars::error::PolarsError`] if the frame cannot be assembled.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let rows = &self.rows;
        df!(
            "date" => rows.iter().map(|r| r.date).collect::<Vec<_>>(),
            "day_key" => rows.iter().map(|r| r.day_key.to_string()).collect::<Vec<_>>(),
            "tmean" => rows.iter().map(|r| r.observed).collect::<Vec<_>>(),
            "baseline_mean" => rows.iter().map(|r| r.baseline_mean).collect::<Vec<_>>(),
            "baseline_upper" => rows.iter().map(|r| r.baseline_upper).collect::<Vec<_>>(),
            "baseline_lower" => rows.iter().map(|r| r.baseline_lower).collect::<Vec<_>>(),
            "anomaly" => rows.iter().map(|r| r.anomaly).collect::<Vec<_>>(),
            "record_high" => rows.iter().map(|r| r.record_high).collect::<Vec<_>>(),
            "record_low" => rows.iter().map(|r| r.record_low).collect::<Vec<_>>(),
            "prcp" => rows.iter().map(|r| r.precipitation).collect::<Vec<_>>(),
            "snow" => rows.iter().map(|r| r.snowfall).collect::<Vec<_>>(),
            "snow_accumulation" => rows.iter().map(|r| r.snow_accumulation).collect::<Vec<_>>(),
        )
    }
}

pub(crate) fn compute(
    observations: &ObservationSet,
    baseline: &DailyBaseline,
    records: &DailyBaseline,
    window: DateWindow,
    available: DateWindow,
    snow_accumulation: bool,
) -> Result<DailySeries, ClimatologyError> {
    let observed = observations.within(&available);
    let mut by_date = observed.iter().peekable();
    let mut accumulated = 0.0;
    let mut rows = Vec::new();

    for date in available.days() {
        let observation: Option<&Observation> = by_date.next_if(|o| o.date() == date);
        let day_key = DayKey::from_date(date);
        let point = BaselinePoint::new(date, baseline.get(day_key));
        let tmean = observation.and_then(Observation::tmean);
        let snowfall = observation.and_then(Observation::snowfall);
        let record = records.get(day_key);

        if snow_accumulation {
            accumulated += snowfall.unwrap_or(0.0);
        }
        rows.push(DailyRow {
            date,
            day_key,
            observed: tmean,
            baseline_mean: point.mean,
            baseline_upper: point.upper,
            baseline_lower: point.lower,
            anomaly: tmean.zip(point.mean).map(|(o, b)| o - b),
            record_high: is_record(tmean, record.and_then(|r| r.tmean_max), |o, r| o >= r),
            record_low: is_record(tmean, record.and_then(|r| r.tmean_min), |o, r| o <= r),
            precipitation: observation.and_then(Observation::precipitation),
            snowfall,
            snow_accumulation: snow_accumulation.then_some(accumulated),
        });
    }

    let last_snow = rows
        .iter()
        .rev()
        .find(|r| r.snowfall.is_some_and(|s| s > 0.0))
        .map(|r| r.date);
    let climatology = window
        .days()
        .map(|date| BaselinePoint::new(date, baseline.get(DayKey::from_date(date))))
        .collect();

    log::debug!(
        "Daily query {} to {} produced {} rows",
        window.start(),
        window.end(),
        rows.len()
    );
    Ok(DailySeries {
        window,
        rows,
        climatology,
        last_snow,
    })
}

fn is_record(observed: Option<f64>, record: Option<f64>, beats: fn(f64, f64) -> bool) -> bool {
    observed.zip(record).is_some_and(|(o, r)| beats(o, r))
}

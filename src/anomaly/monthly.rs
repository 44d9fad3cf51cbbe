//! Monthly anomaly rows joined to the calendar-month normals, with an optional
//! trailing mean.

use crate::aggregate::month::MonthAggregator;
use crate::anomaly::trailing::trailing_mean;
use crate::error::ClimatologyError;
use crate::types::keys::MonthKey;
use crate::types::observation::Quantity;
use crate::types::observation_set::ObservationSet;
use crate::types::tables::{MonthlyAggregate, MonthlyBaseline, MonthlyNormal, MonthlyStats};
use crate::types::window::DateWindow;
use polars::prelude::{df, DataFrame, PolarsResult};
use serde::Serialize;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Quantities a monthly query can compare.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum MonthlyQuantity {
    /// Monthly mean of the daily mean temperature.
    Temperature,
    /// Monthly precipitation total.
    Precipitation,
}

impl MonthlyQuantity {
    /// The daily quantity the monthly figure is built from.
    pub fn quantity(self) -> Quantity {
        match self {
            MonthlyQuantity::Temperature => Quantity::MeanTemperature,
            MonthlyQuantity::Precipitation => Quantity::Precipitation,
        }
    }

    fn observed(self, stats: &MonthlyStats) -> Option<f64> {
        match self {
            MonthlyQuantity::Temperature => stats.summary.tmean_mean,
            MonthlyQuantity::Precipitation => stats.precipitation,
        }
    }

    fn baseline(self, normal: &MonthlyNormal) -> Option<f64> {
        match self {
            MonthlyQuantity::Temperature => normal.summary.tmean_mean,
            MonthlyQuantity::Precipitation => normal.precipitation,
        }
    }
}

impl Display for MonthlyQuantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MonthlyQuantity::Temperature => write!(f, "temperature"),
            MonthlyQuantity::Precipitation => write!(f, "precipitation"),
        }
    }
}

/// The series a trailing mean is taken over.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TrailingBasis {
    /// The observed monthly values.
    #[default]
    Observed,
    /// Observed minus baseline.
    Anomaly,
}

/// One month of a monthly anomaly query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyRow {
    pub month: MonthKey,
    pub observed: Option<f64>,
    pub baseline: Option<f64>,
    pub anomaly: Option<f64>,
    pub trailing_mean: Option<f64>,
}

/// Result of a monthly query: one row per calendar month of the window, up to the
/// month of the latest observation, plus the aggregate the rows were read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySeries {
    quantity: MonthlyQuantity,
    rows: Vec<MonthlyRow>,
    aggregate: MonthlyAggregate,
}

impl MonthlySeries {
    /// The quantity the rows compare.
    pub fn quantity(&self) -> MonthlyQuantity {
        self.quantity
    }

    pub fn rows(&self) -> &[MonthlyRow] {
        &self.rows
    }

    /// Per-month statistics of the queried observations, the source of
    /// [`MonthlyRow::observed`].
    pub fn aggregate(&self) -> &MonthlyAggregate {
        &self.aggregate
    }

    /// Finds the row of one month.
    ///
    /// # Arguments
    ///
    /// * `month` - Year and month, e.g. `MonthKey::new(3, 2020)`.
    ///
    /// # Returns
    ///
    /// * `Some(&MonthlyRow)` if the month lies between the window start and the latest
    ///   observation, even when it holds no data.
    /// * `None` if the month is outside that span.
    pub fn get(&self, month: MonthKey) -> Option<&MonthlyRow> {
        self.rows.iter().find(|r| r.month == month)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Converts the rows to a [`DataFrame`] with a `month_key` label (`YYYY-MM`)
    /// followed by `observed`, `baseline`, `anomaly` and `trailing_mean`.
    ///
    /// # Errors
    ///
    /// Returns a [`polars::error::PolarsError`] if the frame cannot be assembled.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let rows = &self.rows;
        df!(
            "month_key" => rows.iter().map(|r| r.month.to_string()).collect::<Vec<_>>(),
            "observed" => rows.iter().map(|r| r.observed).collect::<Vec<_>>(),
            "baseline" => rows.iter().map(|r| r.baseline).collect::<Vec<_>>(),
            "anomaly" => rows.iter().map(|r| r.anomaly).collect::<Vec<_>>(),
            "trailing_mean" => rows.iter().map(|r| r.trailing_mean).collect::<Vec<_>>(),
        )
    }
}

pub(crate) fn compute(
    observations: &ObservationSet,
    baseline: &MonthlyBaseline,
    quantity: MonthlyQuantity,
    available: DateWindow,
    trailing_window: Option<usize>,
    trailing_on: TrailingBasis,
) -> Result<MonthlySeries, ClimatologyError> {
    let slice = observations.within(&available);
    let aggregate = if slice.is_empty() {
        MonthlyAggregate::default()
    } else {
        MonthAggregator::aggregate(&slice)?
    };

    let last = MonthKey::from_date(available.end());
    let months = std::iter::successors(Some(MonthKey::from_date(available.start())), |m| m.next())
        .take_while(|m| *m <= last);

    let mut rows: Vec<MonthlyRow> = months
        .map(|month| {
            let observed = aggregate.get(month).and_then(|s| quantity.observed(s));
            let normal = month
                .calendar_month()
                .and_then(|m| baseline.get(m))
                .and_then(|n| quantity.baseline(n));
            MonthlyRow {
                month,
                observed,
                baseline: normal,
                anomaly: observed.zip(normal).map(|(o, b)| o - b),
                trailing_mean: None,
            }
        })
        .collect();

    if let Some(window) = trailing_window {
        let basis: Vec<Option<f64>> = rows
            .iter()
            .map(|r| match trailing_on {
                TrailingBasis::Observed => r.observed,
                TrailingBasis::Anomaly => r.anomaly,
            })
            .collect();
        for (row, mean) in rows.iter_mut().zip(trailing_mean(&basis, window)?) {
            row.trailing_mean = mean;
        }
    }

    log::debug!(
        "Monthly {} query {} to {} produced {} rows",
        quantity,
        available.start(),
        available.end(),
        rows.len()
    );
    Ok(MonthlySeries {
        quantity,
        rows,
        aggregate,
    })
}

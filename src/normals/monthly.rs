use crate::aggregate::group_reduce::{group_and_reduce, Reducer, Reduction};
use crate::aggregate::month::MonthAggregator;
use crate::error::ClimatologyError;
use crate::normals::reference_slice;
use crate::types::keys::CalendarMonth;
use crate::types::observation::Quantity;
use crate::types::observation_set::ObservationSet;
use crate::types::tables::{MonthlyBaseline, MonthlyNormal, SummaryStats};
use crate::types::window::DateWindow;
use bon::Builder;
use polars::prelude::IntoLazy;

/// Cross-year collapse of the monthly aggregate, by calendar month.
const MONTH_REDUCTIONS: [Reduction; 8] = [
    Reduction::new("tmean_mean", Reducer::Mean, "tmean_mean"),
    Reduction::new("tmean_mean", Reducer::Std, "tmean_std"),
    Reduction::new("tmean_max", Reducer::Max, "tmean_max"),
    Reduction::new("tmean_min", Reducer::Min, "tmean_min"),
    Reduction::new("tmax_max", Reducer::Max, "tmax_max"),
    Reduction::new("tmax_max", Reducer::Std, "tmax_std"),
    Reduction::new("tmin_min", Reducer::Min, "tmin_min"),
    Reduction::new("tmin_min", Reducer::Std, "tmin_std"),
];

/// Builds the twelve calendar-month normals of a reference period.
///
/// The precipitation normal is the mean of each month's yearly totals multiplied by
/// the number of distinct years in the reference slice, which makes it comparable to
/// a total accumulated over the whole reference span rather than a single month.
#[derive(Debug, Clone, Default, Builder)]
pub struct MonthlyNormalBuilder {
    /// Reference period, 1981-2010 unless set.
    #[builder(default)]
    reference: DateWindow,
}

impl MonthlyNormalBuilder {
    /// The reference period the normals are computed over.
    pub fn reference(&self) -> &DateWindow {
        &self.reference
    }

    /// # Errors
    ///
    /// Same conditions as [`crate::ClimateNormalBuilder::compute`], minus the window check.
    pub fn compute(&self, observations: &ObservationSet) -> Result<MonthlyBaseline, ClimatologyError> {
        let slice = reference_slice(observations, &self.reference)?;
        let quantities = slice.quantities();
        let aggregate = MonthAggregator::aggregate(&slice)?;
        let years = aggregate.year_count() as u32;

        let mut reductions = MONTH_REDUCTIONS.to_vec();
        if quantities.has(Quantity::Snowfall) {
            reductions.push(Reduction::new("snow_mean", Reducer::Mean, "snow_mean"));
        }
        if quantities.has(Quantity::Precipitation) {
            reductions.push(Reduction::new("prcp_sum", Reducer::Mean, "prcp_mean"));
        }

        let rows = group_and_reduce::<CalendarMonth>(aggregate.to_frame()?.lazy(), &reductions)?;
        log::debug!(
            "Collapsed {} reference months over {} years into {} calendar months",
            aggregate.len(),
            years,
            rows.len()
        );
        Ok(MonthlyBaseline::new(
            rows.into_iter()
                .map(|(month, row)| {
                    let normal = MonthlyNormal {
                        summary: SummaryStats::from_row(&row),
                        precipitation: row.get("prcp_mean").map(|mean| mean * f64::from(years)),
                        years,
                    };
                    (month, normal)
                })
                .collect(),
        ))
    }
}

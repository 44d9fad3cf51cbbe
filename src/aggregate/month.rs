use crate::aggregate::group_reduce::{group_and_reduce, ReducedRow, Reducer, Reduction};
use crate::aggregate::summary_reductions;
use crate::error::ClimatologyError;
use crate::types::keys::MonthKey;
use crate::types::observation::Quantity;
use crate::types::observation_set::ObservationSet;
use crate::types::tables::{MonthlyAggregate, MonthlyStats, SummaryStats};

/// Groups observations by year and month.
///
/// Temperatures are state quantities and are averaged; precipitation accumulates
/// and is summed over the observed days of each month.
pub struct MonthAggregator;

impl MonthAggregator {
    /// # Errors
    ///
    /// Returns [`ClimatologyError::EmptyInput`] if `observations` is empty.
    pub fn aggregate(observations: &ObservationSet) -> Result<MonthlyAggregate, ClimatologyError> {
        if observations.is_empty() {
            return Err(ClimatologyError::EmptyInput);
        }
        let quantities = observations.quantities();
        let has_precipitation = quantities.has(Quantity::Precipitation);

        let mut reductions = summary_reductions(quantities);
        reductions.push(Reduction::new("tmean", Reducer::Count, "days"));
        if has_precipitation {
            reductions.push(Reduction::new("prcp", Reducer::Sum, "prcp_sum"));
            reductions.push(Reduction::new("prcp", Reducer::Count, "prcp_days"));
        }

        let rows = group_and_reduce::<MonthKey>(observations.lazy()?, &reductions)?;
        log::debug!(
            "Aggregated {} observations into {} months",
            observations.len(),
            rows.len()
        );
        Ok(MonthlyAggregate::new(
            rows.into_iter()
                .map(|(key, row)| {
                    let stats = MonthlyStats {
                        summary: SummaryStats::from_row(&row),
                        precipitation: monthly_total(&row),
                        days: row.get("days").map_or(0, |d| d as u32),
                    };
                    (key, stats)
                })
                .collect(),
        ))
    }
}

/// Sum of the reported precipitation, `None` when no day of the month reported any.
/// Polars sums an all-null group to zero.
fn monthly_total(row: &ReducedRow) -> Option<f64> {
    match row.get("prcp_days") {
        Some(days) if days > 0.0 => row.get("prcp_sum"),
        _ => None,
    }
}

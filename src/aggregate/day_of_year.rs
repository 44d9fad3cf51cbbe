use crate::aggregate::group_reduce::group_and_reduce;
use crate::aggregate::summary_reductions;
use crate::error::ClimatologyError;
use crate::types::keys::DayKey;
use crate::types::observation_set::ObservationSet;
use crate::types::tables::{DailyBaseline, SummaryStats};

/// Groups observations by calendar day across every year in the input.
///
/// A Feb-29 entry appears only when the input contains leap years, and it is
/// built from those years alone.
pub struct DayOfYearAggregator;

impl DayOfYearAggregator {
    /// # Errors
    ///
    /// Returns [`ClimatologyError::EmptyInput`] if `observations` is empty.
    pub fn aggregate(observations: &ObservationSet) -> Result<DailyBaseline, ClimatologyError> {
        if observations.is_empty() {
            return Err(ClimatologyError::EmptyInput);
        }
        let rows = group_and_reduce::<DayKey>(
            observations.lazy()?,
            &summary_reductions(observations.quantities()),
        )?;
        log::debug!(
            "Aggregated {} observations into {} day-of-year groups",
            observations.len(),
            rows.len()
        );
        Ok(DailyBaseline::new(
            rows.into_iter()
                .map(|(key, row)| (key, SummaryStats::from_row(&row)))
                .collect(),
        ))
    }
}

//! Observed-versus-baseline comparisons over arbitrary query windows.
//!
//! An [`AnomalyCalculator`] borrows an observation set together with the baselines
//! built from it, and answers daily or monthly queries. It holds no mutable state,
//! so any number of queries may run against the same baselines.

pub mod daily;
pub mod monthly;
pub mod trailing;

pub use daily::{BaselinePoint, DailyRow, DailySeries};
pub use monthly::{MonthlyQuantity, MonthlyRow, MonthlySeries, TrailingBasis};

use crate::error::ClimatologyError;
use crate::types::observation::Quantity;
use crate::types::observation_set::ObservationSet;
use crate::types::tables::{DailyBaseline, MonthlyBaseline};
use crate::types::window::DateWindow;
use bon::bon;

/// Answers anomaly queries against precomputed baselines.
///
/// Usually obtained through [`crate::Climatology::anomalies`].
#[derive(Debug, Clone, Copy)]
pub struct AnomalyCalculator<'a> {
    observations: &'a ObservationSet,
    daily: &'a DailyBaseline,
    monthly: &'a MonthlyBaseline,
    /// Day-of-year extremes over the complete series, used for record markers.
    records: &'a DailyBaseline,
}

#[bon]
impl<'a> AnomalyCalculator<'a> {
    pub fn new(
        observations: &'a ObservationSet,
        daily: &'a DailyBaseline,
        monthly: &'a MonthlyBaseline,
        records: &'a DailyBaseline,
    ) -> Self {
        Self {
            observations,
            daily,
            monthly,
            records,
        }
    }

    /// Day-by-day comparison of mean temperature with the daily baseline.
    ///
    /// Each date is aligned to its [`crate::DayKey`], so windows may cross a year
    /// boundary. Dates after the latest observation are left out of the rows.
    ///
    /// # Errors
    ///
    /// * [`ClimatologyError::MissingColumn`] if the set has no mean temperature, or no
    ///   snowfall while `snow_accumulation` is requested.
    /// * [`ClimatologyError::InvalidDateRange`] if the window lies entirely before or
    ///   after the observations.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use climatology::{Climatology, DateWindow, ObservationSet};
    ///
    /// # fn run(observations: ObservationSet) -> Result<(), climatology::ClimatologyError> {
    /// let climatology = Climatology::builder().observations(observations).build()?;
    /// let winter = climatology
    ///     .anomalies()
    ///     .daily(DateWindow::season(2020)?)
    ///     .snow_accumulation(true)
    ///     .call()?;
    /// println!("Last snow fell on {:?}", winter.last_snow());
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = daily)]
    #[doc(hidden)]
    pub fn build_daily(
        &self,
        #[builder(start_fn)] window: DateWindow,
        #[builder(default)] snow_accumulation: bool,
    ) -> Result<DailySeries, ClimatologyError> {
        self.require(Quantity::MeanTemperature)?;
        if snow_accumulation {
            self.require(Quantity::Snowfall)?;
        }
        let available = self.available_window(&window)?;
        daily::compute(
            self.observations,
            self.daily,
            self.records,
            window,
            available,
            snow_accumulation,
        )
    }

    /// Month-by-month comparison of a quantity with the monthly baseline.
    ///
    /// Precipitation is compared as monthly totals, temperature as monthly means.
    /// An optional trailing mean over `trailing_window` months runs over the observed
    /// values or over the anomalies, as chosen by `trailing_on`.
    ///
    /// # Errors
    ///
    /// * [`ClimatologyError::MissingColumn`] if the requested quantity is absent.
    /// * [`ClimatologyError::InvalidDateRange`] if the window lies entirely before or
    ///   after the observations.
    /// * [`ClimatologyError::InvalidWindow`] if `trailing_window` is zero.
    #[builder(start_fn = monthly)]
    #[doc(hidden)]
    pub fn build_monthly(
        &self,
        #[builder(start_fn)] window: DateWindow,
        #[builder(start_fn)] quantity: MonthlyQuantity,
        trailing_window: Option<usize>,
        #[builder(default)] trailing_on: TrailingBasis,
    ) -> Result<MonthlySeries, ClimatologyError> {
        self.require(quantity.quantity())?;
        let available = self.available_window(&window)?;
        monthly::compute(
            self.observations,
            self.monthly,
            quantity,
            available,
            trailing_window,
            trailing_on,
        )
    }
}

impl AnomalyCalculator<'_> {
    fn require(&self, quantity: Quantity) -> Result<(), ClimatologyError> {
        if self.observations.quantities().has(quantity) {
            Ok(())
        } else {
            Err(ClimatologyError::MissingColumn(quantity))
        }
    }

    /// The part of `window` that has observations behind it: the window itself with its
    /// end pulled back to the latest observation.
    fn available_window(&self, window: &DateWindow) -> Result<DateWindow, ClimatologyError> {
        let (Some(first), Some(last)) = (
            self.observations.first_date(),
            self.observations.last_date(),
        ) else {
            return Err(ClimatologyError::EmptyInput);
        };
        if window.end() < first {
            return Err(ClimatologyError::InvalidDateRange {
                start: window.start(),
                end: window.end(),
                reason: "window ends before the first observation",
            });
        }
        if window.start() > last {
            return Err(ClimatologyError::InvalidDateRange {
                start: window.start(),
                end: window.end(),
                reason: "window starts after the latest observation",
            });
        }
        let available = window.truncated_to(last);
        if available.end() < window.end() {
            log::info!(
                "Query window {} to {} truncated at latest observation {}",
                window.start(),
                window.end(),
                last
            );
        }
        Ok(available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, observation, synthetic_set};
    use crate::types::observation::Quantities;

    #[test]
    fn test_window_outside_data_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2001, 2002, |_| 1.0);
        let baseline = DailyBaseline::default();
        let monthly = MonthlyBaseline::default();
        let calculator = AnomalyCalculator::new(&set, &baseline, &monthly, &baseline);

        let before = calculator.daily(DateWindow::new("1990-01-01", "1990-12-31")?).call();
        assert!(matches!(before, Err(ClimatologyError::InvalidDateRange { .. })));

        let after = calculator
            .monthly(DateWindow::new("2005-01-01", "2005-12-31")?, MonthlyQuantity::Temperature)
            .call();
        assert!(matches!(after, Err(ClimatologyError::InvalidDateRange { .. })));
        Ok(())
    }

    #[test]
    fn test_missing_quantity_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let set = ObservationSet::with_quantities(
            vec![observation(date(2001, 1, 1), 1.0)],
            Quantities::TEMPERATURE,
        )?;
        let baseline = DailyBaseline::default();
        let monthly = MonthlyBaseline::default();
        let calculator = AnomalyCalculator::new(&set, &baseline, &monthly, &baseline);
        let window = DateWindow::new("2001-01-01", "2001-01-31")?;

        let snow = calculator.daily(window).snow_accumulation(true).call();
        assert!(matches!(
            snow,
            Err(ClimatologyError::MissingColumn(Quantity::Snowfall))
        ));
        let prcp = calculator
            .monthly(window, MonthlyQuantity::Precipitation)
            .call();
        assert!(matches!(
            prcp,
            Err(ClimatologyError::MissingColumn(Quantity::Precipitation))
        ));
        Ok(())
    }

    #[test]
    fn test_window_is_truncated_at_latest_observation() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2001, 2001, |_| 1.0);
        let baseline = DailyBaseline::default();
        let monthly = MonthlyBaseline::default();
        let calculator = AnomalyCalculator::new(&set, &baseline, &monthly, &baseline);
        let available = calculator.available_window(&DateWindow::new("2001-07-01", "2002-06-30")?)?;
        assert_eq!(available.start(), date(2001, 7, 1));
        assert_eq!(available.end(), date(2001, 12, 31));
        Ok(())
    }
}

//! Day-of-year climate normals: aggregation over a reference period, Feb-29
//! imputation and circular smoothing.

use crate::aggregate::day_of_year::DayOfYearAggregator;
use crate::error::ClimatologyError;
use crate::normals::reference_slice;
use crate::normals::smoothing::smooth_baseline;
use crate::types::keys::DayKey;
use crate::types::observation_set::ObservationSet;
use crate::types::tables::{DailyBaseline, SummaryStats};
use crate::types::window::DateWindow;
use bon::Builder;

/// Smoothing window used when none is set, in days.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 7;

/// Builds the day-of-year baseline of a reference period: 365 calendar days, plus
/// Feb 29 when leap-day imputation is on (the default).
///
/// # Example
///
/// ```no_run
/// use climatology::{ClimateNormalBuilder, DateWindow, ObservationSet, Year};
///
/// # fn run(observations: ObservationSet) -> Result<(), climatology::ClimatologyError> {
/// let normals = ClimateNormalBuilder::builder()
///     .reference(DateWindow::new(Year(1991), Year(2020))?)
///     .smoothing_window(15)
///     .build()
///     .compute(&observations)?;
/// assert_eq!(normals.len(), 366);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ClimateNormalBuilder {
    /// Reference period, 1981-2010 unless set.
    #[builder(default)]
    reference: DateWindow,
    /// Length of the circular moving average. Even lengths disable smoothing.
    #[builder(default = DEFAULT_SMOOTHING_WINDOW)]
    smoothing_window: usize,
    /// Whether to insert a Feb-29 entry between Feb-28 and Mar-01.
    #[builder(default = true)]
    impute_leap_day: bool,
}

impl Default for ClimateNormalBuilder {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ClimateNormalBuilder {
    /// The reference period the baseline is computed over.
    pub fn reference(&self) -> &DateWindow {
        &self.reference
    }

    /// Computes the baseline from the reference slice of `observations`.
    ///
    /// # Errors
    ///
    /// * [`ClimatologyError::EmptyInput`] if there is nothing to aggregate.
    /// * [`ClimatologyError::InsufficientData`] if the data ends before the reference period does.
    /// * [`ClimatologyError::InvalidWindow`] if the smoothing window is zero.
    pub fn compute(&self, observations: &ObservationSet) -> Result<DailyBaseline, ClimatologyError> {
        if self.smoothing_window == 0 {
            return Err(ClimatologyError::InvalidWindow(self.smoothing_window));
        }
        let slice = reference_slice(observations, &self.reference)?;
        let mut baseline = DayOfYearAggregator::aggregate(&slice)?;
        fill_calendar_gaps(&mut baseline);

        if self.impute_leap_day {
            impute_leap_day(&mut baseline);
        }

        if self.smoothing_window % 2 == 0 {
            log::warn!(
                "Smoothing window {} is even, daily normals are left unsmoothed",
                self.smoothing_window
            );
            return Ok(baseline);
        }
        smooth_baseline(&baseline, self.smoothing_window)
    }
}

/// Adds an empty entry for every common-year day the reference slice never observed,
/// so that smoothing runs along an unbroken calendar.
fn fill_calendar_gaps(baseline: &mut DailyBaseline) {
    let missing: Vec<DayKey> = DayKey::common_year()
        .filter(|key| !baseline.contains(*key))
        .collect();
    if missing.is_empty() {
        return;
    }
    log::warn!(
        "{} calendar days have no reference observations, first is {}",
        missing.len(),
        missing[0]
    );
    for key in missing {
        baseline.insert(key, SummaryStats::default());
    }
}

/// Inserts Feb-29 as the plain mean of Feb-28 and Mar-01, field by field.
///
/// Leaves the baseline untouched when either neighbour is absent.
pub fn impute_leap_day(baseline: &mut DailyBaseline) {
    let (Some(feb_28), Some(mar_1)) = (
        DayKey::new(2, 28).and_then(|k| baseline.get(k).copied()),
        DayKey::new(3, 1).and_then(|k| baseline.get(k).copied()),
    ) else {
        log::warn!("Cannot impute Feb-29 without both Feb-28 and Mar-01");
        return;
    };
    let leap_day = SummaryStats::zip_with(&[feb_28, mar_1], |values| match values {
        [Some(a), Some(b)] => Some((a + b) / 2.0),
        _ => None,
    });
    baseline.entries_mut().insert(DayKey::LEAP_DAY, leap_day);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{observation, synthetic_set};
    use chrono::{Datelike, NaiveDate};
    use std::collections::BTreeMap;

    fn key(month: u32, day: u32) -> DayKey {
        DayKey::new(month, day).unwrap()
    }

    #[test]
    fn test_baseline_covers_every_calendar_day() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2000, 2004, |d| f64::from(d.ordinal() % 30));
        let baseline = ClimateNormalBuilder::builder()
            .reference(DateWindow::new("2000-01-01", "2003-12-31")?)
            .build()
            .compute(&set)?;
        assert_eq!(baseline.len(), 366);
        assert!(baseline.contains(DayKey::LEAP_DAY));
        Ok(())
    }

    #[test]
    fn test_without_imputation_leap_day_is_absent() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2000, 2004, |_| 1.0);
        let baseline = ClimateNormalBuilder::builder()
            .reference(DateWindow::new("2000-01-01", "2003-12-31")?)
            .impute_leap_day(false)
            .build()
            .compute(&set)?;
        assert_eq!(baseline.len(), 365);
        assert!(!baseline.contains(DayKey::LEAP_DAY));
        Ok(())
    }

    #[test]
    fn test_leap_day_is_mean_of_neighbours() -> Result<(), Box<dyn std::error::Error>> {
        // Unsmoothed so the imputed value can be checked exactly.
        let set = synthetic_set(2001, 2003, |d| f64::from(d.ordinal()) + f64::from(d.year()));
        let baseline = ClimateNormalBuilder::builder()
            .reference(DateWindow::new("2001-01-01", "2003-12-31")?)
            .smoothing_window(1)
            .build()
            .compute(&set)?;
        let feb_28 = baseline.get(key(2, 28)).unwrap();
        let mar_1 = baseline.get(key(3, 1)).unwrap();
        let leap = baseline.get(DayKey::LEAP_DAY).unwrap();
        assert_eq!(
            leap.tmean_mean,
            Some((feb_28.tmean_mean.unwrap() + mar_1.tmean_mean.unwrap()) / 2.0)
        );
        assert_eq!(
            leap.tmax_max,
            Some((feb_28.tmax_max.unwrap() + mar_1.tmax_max.unwrap()) / 2.0)
        );
        Ok(())
    }

    #[test]
    fn test_impute_leap_day_needs_both_neighbours() {
        let mut entries = BTreeMap::new();
        entries.insert(
            key(2, 28),
            SummaryStats {
                tmean_mean: Some(1.0),
                ..Default::default()
            },
        );
        let mut baseline = DailyBaseline::new(entries);
        impute_leap_day(&mut baseline);
        assert!(!baseline.contains(DayKey::LEAP_DAY));
    }

    #[test]
    fn test_smoothing_wraps_year_boundary() -> Result<(), Box<dyn std::error::Error>> {
        // Warm December, cold rest of the year: a sharp step at the year boundary.
        let set = synthetic_set(2001, 2003, |d| if d.month() == 12 { 20.0 } else { 0.0 });
        let reference = DateWindow::new("2001-01-01", "2003-12-31")?;
        let smoothed = ClimateNormalBuilder::builder()
            .reference(reference)
            .smoothing_window(7)
            .build()
            .compute(&set)?;
        let raw = ClimateNormalBuilder::builder()
            .reference(reference)
            .smoothing_window(1)
            .build()
            .compute(&set)?;

        let jan_1 = smoothed.get(key(1, 1)).unwrap().tmean_mean.unwrap();
        let dec_31 = smoothed.get(key(12, 31)).unwrap().tmean_mean.unwrap();
        // Jan-1 averages Dec 29..31 and Jan 1..4, Dec-31 averages Dec 28..31 and Jan 1..3.
        assert!((jan_1 - 60.0 / 7.0).abs() < 1e-9);
        assert!((dec_31 - 80.0 / 7.0).abs() < 1e-9);

        // A non-wrapping window would see only January values at Jan-1.
        let jan_1_raw = raw.get(key(1, 1)).unwrap().tmean_mean.unwrap();
        assert_eq!(jan_1_raw, 0.0);
        assert_ne!(jan_1, jan_1_raw);
        Ok(())
    }

    #[test]
    fn test_even_window_leaves_baseline_unsmoothed() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2001, 2003, |d| f64::from(d.ordinal()));
        let reference = DateWindow::new("2001-01-01", "2003-12-31")?;
        let even = ClimateNormalBuilder::builder()
            .reference(reference)
            .smoothing_window(8)
            .build()
            .compute(&set)?;
        let raw = ClimateNormalBuilder::builder()
            .reference(reference)
            .smoothing_window(1)
            .build()
            .compute(&set)?;
        assert_eq!(even, raw);
        Ok(())
    }

    #[test]
    fn test_std_band_brackets_mean() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2001, 2005, |d| {
            f64::from(d.ordinal()).sin() * 10.0 + f64::from(d.year() % 3)
        });
        let baseline = ClimateNormalBuilder::builder()
            .reference(DateWindow::new("2001-01-01", "2005-12-31")?)
            .build()
            .compute(&set)?;
        for (_, stats) in baseline.iter() {
            if let (Some(mean), Some(upper), Some(lower)) =
                (stats.tmean_mean, stats.tmean_upper(), stats.tmean_lower())
            {
                assert!(upper >= mean && mean >= lower);
            }
        }
        Ok(())
    }

    #[test]
    fn test_compute_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2001, 2004, |d| f64::from(d.ordinal() % 17) * 0.3);
        let builder = ClimateNormalBuilder::builder()
            .reference(DateWindow::new("2001-01-01", "2003-12-31")?)
            .build();
        assert_eq!(builder.compute(&set)?, builder.compute(&set)?);
        Ok(())
    }

    #[test]
    fn test_reference_uses_only_its_own_years() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2001, 2004, |d| if d.year() == 2004 { 100.0 } else { 3.0 });
        let baseline = ClimateNormalBuilder::builder()
            .reference(DateWindow::new("2001-01-01", "2003-12-31")?)
            .build()
            .compute(&set)?;
        assert!(baseline
            .iter()
            .all(|(_, s)| s.tmean_mean.is_some_and(|m| (m - 3.0).abs() < 1e-9)));
        Ok(())
    }

    #[test]
    fn test_gaps_in_reference_are_filled() -> Result<(), Box<dyn std::error::Error>> {
        let set = ObservationSet::new(vec![
            observation(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(), 1.0),
            observation(NaiveDate::from_ymd_opt(2001, 12, 31).unwrap(), 1.0),
        ])?;
        let baseline = ClimateNormalBuilder::builder()
            .reference(DateWindow::new("2001-01-01", "2001-12-31")?)
            .smoothing_window(1)
            .build()
            .compute(&set)?;
        assert_eq!(baseline.len(), 366);
        assert_eq!(baseline.get(key(6, 1)).unwrap().tmean_mean, None);
        assert_eq!(baseline.get(key(1, 1)).unwrap().tmean_mean, Some(1.0));
        Ok(())
    }

    #[test]
    fn test_zero_window_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let set = synthetic_set(2001, 2001, |_| 1.0);
        let result = ClimateNormalBuilder::builder()
            .reference(DateWindow::new("2001-01-01", "2001-12-31")?)
            .smoothing_window(0)
            .build()
            .compute(&set);
        assert!(matches!(result, Err(ClimatologyError::InvalidWindow(0))));
        Ok(())
    }

    #[test]
    fn test_reference_past_data_fails() {
        let set = synthetic_set(2001, 2003, |_| 1.0);
        let result = ClimateNormalBuilder::default().compute(&set);
        assert!(matches!(result, Err(ClimatologyError::InsufficientData { .. })));
    }
}

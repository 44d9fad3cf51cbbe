use crate::aggregate::day_of_year::DayOfYearAggregator;
use crate::anomaly::AnomalyCalculator;
use crate::error::ClimatologyError;
use crate::normals::daily::{ClimateNormalBuilder, DEFAULT_SMOOTHING_WINDOW};
use crate::normals::monthly::MonthlyNormalBuilder;
use crate::types::observation_set::ObservationSet;
use crate::types::tables::{DailyBaseline, MonthlyBaseline};
use crate::types::window::DateWindow;
use bon::bon;

/// An observation set together with the baselines built from it.
///
/// Construction runs both normal builders once; afterwards every query borrows the
/// stored baselines.
///
/// # Example
///
/// ```no_run
/// use climatology::{Climatology, DateWindow, MonthlyQuantity, ObservationSet, Year};
///
/// # fn run(observations: ObservationSet) -> Result<(), climatology::ClimatologyError> {
/// let climatology = Climatology::builder()
///     .observations(observations)
///     .location("KOTZEBUE")
///     .reference(DateWindow::new(Year(1981), Year(2010))?)
///     .smoothing_window(7)
///     .build()?;
///
/// let precipitation = climatology
///     .anomalies()
///     .monthly(DateWindow::new(Year(2020), Year(2020))?, MonthlyQuantity::Precipitation)
///     .trailing_window(3)
///     .call()?;
/// for row in precipitation.rows() {
///     println!("{}: {:?}", row.month, row.anomaly);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Climatology {
    observations: ObservationSet,
    reference: DateWindow,
    daily_normals: DailyBaseline,
    monthly_normals: MonthlyBaseline,
    records: DailyBaseline,
}

#[bon]
impl Climatology {
    /// # Errors
    ///
    /// * [`ClimatologyError::InvalidLocation`] if `location` matches no station name.
    /// * Any error of [`ClimateNormalBuilder::compute`] or [`MonthlyNormalBuilder::compute`].
    #[builder]
    pub fn new(
        observations: ObservationSet,
        // Case-insensitive match on station names.
        #[builder(into)]
        location: Option<String>,
        #[builder(default)] reference: DateWindow,
        #[builder(default = DEFAULT_SMOOTHING_WINDOW)] smoothing_window: usize,
        #[builder(default = true)] impute_leap_day: bool,
    ) -> Result<Self, ClimatologyError> {
        let observations = match location {
            Some(location) => observations.for_location(&location)?,
            None => observations,
        };
        let daily_normals = ClimateNormalBuilder::builder()
            .reference(reference)
            .smoothing_window(smoothing_window)
            .impute_leap_day(impute_leap_day)
            .build()
            .compute(&observations)?;
        let monthly_normals = MonthlyNormalBuilder::builder()
            .reference(reference)
            .build()
            .compute(&observations)?;
        let records = DayOfYearAggregator::aggregate(&observations)?;

        log::info!(
            "Built climatology for {} to {} from {} observations",
            reference.start(),
            reference.end(),
            observations.len()
        );
        Ok(Self {
            observations,
            reference,
            daily_normals,
            monthly_normals,
            records,
        })
    }
}

impl Climatology {
    /// The observations the tables were built from, after the location filter.
    pub fn observations(&self) -> &ObservationSet {
        &self.observations
    }

    pub fn reference(&self) -> &DateWindow {
        &self.reference
    }

    /// The smoothed day-of-year baseline of the reference period.
    pub fn daily_normals(&self) -> &DailyBaseline {
        &self.daily_normals
    }

    /// The twelve calendar-month normals of the reference period.
    pub fn monthly_normals(&self) -> &MonthlyBaseline {
        &self.monthly_normals
    }

    /// Day-of-year extremes of the complete series.
    pub fn records(&self) -> &DailyBaseline {
        &self.records
    }

    /// Starts an anomaly query against the stored tables.
    ///
    /// # Returns
    ///
    /// An [`AnomalyCalculator`] borrowing this climatology. Daily queries compare
    /// against [`Climatology::daily_normals`] and flag records from
    /// [`Climatology::records`], while monthly queries use
    /// [`Climatology::monthly_normals`].
    pub fn anomalies(&self) -> AnomalyCalculator<'_> {
        AnomalyCalculator::new(
            &self.observations,
            &self.daily_normals,
            &self.monthly_normals,
            &self.records,
        )
    }
}

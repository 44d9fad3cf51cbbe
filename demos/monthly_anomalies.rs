//! Monthly precipitation and temperature anomalies with a three-month trailing mean.

use chrono::{Datelike, Days, NaiveDate};
use climatology::{
    Climatology, ClimatologyError, DateWindow, MonthlyQuantity, Observation, ObservationSet,
    TrailingBasis, Year,
};

fn synthetic_station() -> Result<ObservationSet, ClimatologyError> {
    let start = NaiveDate::from_ymd_opt(1991, 1, 1).ok_or(ClimatologyError::DateParsingError)?;
    let end = NaiveDate::from_ymd_opt(2021, 12, 31).ok_or(ClimatologyError::DateParsingError)?;
    let observations = std::iter::successors(Some(start), |d| d.checked_add_days(Days::new(1)))
        .take_while(|d| *d <= end)
        .map(|date| {
            let season = (f64::from(date.ordinal()) / 365.25 * std::f64::consts::TAU).cos();
            let tmean = 10.0 - 8.0 * season;
            let wet = (date.num_days_from_ce() % 4 == 0) as u8;
            Observation::builder()
                .date(date)
                .tmin(tmean - 4.0)
                .tmax(tmean + 4.0)
                .precipitation(f64::from(wet) * 6.0)
                .build()
        })
        .collect();
    ObservationSet::new(observations)
}

fn main() -> Result<(), ClimatologyError> {
    let climatology = Climatology::builder()
        .observations(synthetic_station()?)
        .reference(DateWindow::new(Year(1991), Year(2020))?)
        .build()?;
    println!("{}", climatology.monthly_normals().to_frame()?);

    let year = DateWindow::for_period(Year(2021))?;
    for quantity in [MonthlyQuantity::Temperature, MonthlyQuantity::Precipitation] {
        let series = climatology
            .anomalies()
            .monthly(year, quantity)
            .trailing_window(3)
            .trailing_on(TrailingBasis::Anomaly)
            .call()?;
        println!("{quantity} anomalies for 2021");
        println!("{}", series.to_frame()?);
    }
    Ok(())
}

//! Daily temperature anomalies and snow accumulation for one winter season.

use chrono::{Datelike, Days, NaiveDate};
use climatology::{Climatology, ClimatologyError, DateWindow, Observation, ObservationSet, Year};

fn synthetic_station() -> Result<ObservationSet, ClimatologyError> {
    let start = NaiveDate::from_ymd_opt(1981, 1, 1).ok_or(ClimatologyError::DateParsingError)?;
    let end = NaiveDate::from_ymd_opt(2021, 3, 15).ok_or(ClimatologyError::DateParsingError)?;
    let observations = std::iter::successors(Some(start), |d| d.checked_add_days(Days::new(1)))
        .take_while(|d| *d <= end)
        .map(|date| {
            let season = (f64::from(date.ordinal()) / 365.25 * std::f64::consts::TAU).cos();
            let tmean = -18.0 * season + 2.0 + f64::from(date.year() - 1981) * 0.05;
            Observation::builder()
                .date(date)
                .station("USW00026616")
                .name("KOTZEBUE RALPH WIEN MEMORIAL AIRPORT, AK US")
                .tmin(tmean - 5.0)
                .tmax(tmean + 5.0)
                .precipitation(0.5)
                .snowfall(if tmean < -5.0 && date.day() % 3 == 0 { 4.0 } else { 0.0 })
                .build()
        })
        .collect();
    ObservationSet::new(observations)
}

fn main() -> Result<(), ClimatologyError> {
    let climatology = Climatology::builder()
        .observations(synthetic_station()?)
        .location("kotzebue")
        .reference(DateWindow::new(Year(1981), Year(2010))?)
        .build()?;

    let winter = climatology
        .anomalies()
        .daily(DateWindow::season(2020)?)
        .snow_accumulation(true)
        .call()?;

    println!(
        "{} observed days of {} requested",
        winter.len(),
        winter.climatology().len()
    );
    for row in winter.records_high() {
        println!("Record high on {}: {:?} °C", row.date, row.observed);
    }
    if let Some(last) = winter.rows().last() {
        println!(
            "Snow accumulated through {}: {:?} mm, last snow on {:?}",
            last.date,
            last.snow_accumulation,
            winter.last_snow()
        );
    }
    println!("{}", winter.to_frame()?.tail(Some(10)));
    Ok(())
}

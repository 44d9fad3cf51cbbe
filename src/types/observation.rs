use bitflags::bitflags;
use bon::bon;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::fmt::{Display, Formatter};

/// One day of weather at one station. Temperatures in °C, precipitation and snowfall in mm.
///
/// The daily mean temperature is derived once at construction as the midpoint of
/// `tmin` and `tmax`, and is missing whenever either bound is missing.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Observation {
    date: NaiveDate,
    station: String,
    name: String,
    tmin: Option<f64>,
    tmax: Option<f64>,
    tmean: Option<f64>,
    precipitation: Option<f64>,
    snowfall: Option<f64>,
}

#[bon]
impl Observation {
    /// # Example
    ///
    /// ```
    /// use climatology::Observation;
    /// use chrono::NaiveDate;
    ///
    /// let obs = Observation::builder()
    ///     .date(NaiveDate::from_ymd_opt(2021, 1, 15).unwrap())
    ///     .station("USW00026616")
    ///     .name("KOTZEBUE RALPH WIEN MEMORIAL AIRPORT, AK US")
    ///     .tmin(-30.0)
    ///     .tmax(-20.0)
    ///     .build();
    /// assert_eq!(obs.tmean(), Some(-25.0));
    /// assert_eq!(obs.snowfall(), None);
    /// ```
    #[builder]
    pub fn new(
        date: NaiveDate,
        #[builder(into, default)] station: String,
        #[builder(into, default)] name: String,
        tmin: Option<f64>,
        tmax: Option<f64>,
        precipitation: Option<f64>,
        snowfall: Option<f64>,
    ) -> Self {
        let tmean = match (tmin, tmax) {
            (Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
            _ => None,
        };
        Self {
            date,
            station,
            name,
            tmin,
            tmax,
            tmean,
            precipitation,
            snowfall,
        }
    }
}

impl Observation {
    pub fn date(&self) -> NaiveDate {
        self.date
    }
    pub fn station(&self) -> &str {
        &self.station
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn tmin(&self) -> Option<f64> {
        self.tmin
    }
    pub fn tmax(&self) -> Option<f64> {
        self.tmax
    }
    pub fn tmean(&self) -> Option<f64> {
        self.tmean
    }
    pub fn precipitation(&self) -> Option<f64> {
        self.precipitation
    }
    pub fn snowfall(&self) -> Option<f64> {
        self.snowfall
    }

    pub fn value(&self, quantity: Quantity) -> Option<f64> {
        match quantity {
            Quantity::MinTemperature => self.tmin,
            Quantity::MaxTemperature => self.tmax,
            Quantity::MeanTemperature => self.tmean,
            Quantity::Precipitation => self.precipitation,
            Quantity::Snowfall => self.snowfall,
        }
    }
}

/// A measured (or derived) daily quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Quantity {
    MinTemperature,
    MaxTemperature,
    MeanTemperature,
    Precipitation,
    Snowfall,
}

impl Quantity {
    pub const ALL: [Quantity; 5] = [
        Quantity::MinTemperature,
        Quantity::MaxTemperature,
        Quantity::MeanTemperature,
        Quantity::Precipitation,
        Quantity::Snowfall,
    ];

    /// Column name in observation frames.
    pub fn column(self) -> &'static str {
        match self {
            Quantity::MinTemperature => "tmin",
            Quantity::MaxTemperature => "tmax",
            Quantity::MeanTemperature => "tmean",
            Quantity::Precipitation => "prcp",
            Quantity::Snowfall => "snow",
        }
    }

    pub fn flag(self) -> Quantities {
        match self {
            Quantity::MinTemperature => Quantities::TMIN,
            Quantity::MaxTemperature => Quantities::TMAX,
            Quantity::MeanTemperature => Quantities::TMEAN,
            Quantity::Precipitation => Quantities::PRECIPITATION,
            Quantity::Snowfall => Quantities::SNOWFALL,
        }
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

bitflags! {
    /// Which quantities an observation set actually carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Quantities: u32 {
        const TMIN          = 1 << 0;
        const TMAX          = 1 << 1;
        const TMEAN         = 1 << 2;
        const PRECIPITATION = 1 << 3;
        const SNOWFALL      = 1 << 4;

        const TEMPERATURE = Self::TMIN.bits()
                          | Self::TMAX.bits()
                          | Self::TMEAN.bits();

        const ALL = Self::TEMPERATURE.bits()
                  | Self::PRECIPITATION.bits()
                  | Self::SNOWFALL.bits();

        const NONE = 0;
    }
}

impl Quantities {
    /// Flags every quantity that has at least one non-missing value.
    pub fn detect<'a>(observations: impl IntoIterator<Item = &'a Observation>) -> Self {
        observations
            .into_iter()
            .fold(Quantities::NONE, |found, obs| {
                Quantity::ALL
                    .into_iter()
                    .filter(|q| obs.value(*q).is_some())
                    .fold(found, |acc, q| acc | q.flag())
            })
    }

    pub fn has(self, quantity: Quantity) -> bool {
        self.contains(quantity.flag())
    }
}

impl Default for Quantities {
    fn default() -> Self {
        Quantities::ALL
    }
}

use crate::types::observation::Quantity;
use chrono::NaiveDate;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimatologyError {
    #[error("No observations to aggregate")]
    EmptyInput,

    #[error("Reference period ending {reference_end} exceeds available data ({first} to {last})")]
    InsufficientData {
        reference_end: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },

    #[error("Requested quantity '{0}' is absent from the dataset")]
    MissingColumn(Quantity),

    #[error("Invalid date range {start} to {end}: {reason}")]
    InvalidDateRange {
        start: NaiveDate,
        end: NaiveDate,
        reason: &'static str,
    },

    #[error("No station matches location '{0}'")]
    InvalidLocation(String),

    #[error("Observation set contains more than one record for {0}")]
    DuplicateDate(NaiveDate),

    #[error("Window length {0} is not valid, it must be at least 1")]
    InvalidWindow(usize),

    #[error("Failed to parse date")]
    DateParsingError,

    #[error("Failed processing DataFrame: {0}")]
    DataFrame(#[from] PolarsError),
}

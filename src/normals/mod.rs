pub mod daily;
pub mod monthly;
pub mod smoothing;

use crate::error::ClimatologyError;
use crate::types::observation_set::ObservationSet;
use crate::types::window::DateWindow;

/// The part of `observations` a normal is built from: the reference window without Feb-29.
///
/// # Errors
///
/// * [`ClimatologyError::EmptyInput`] if there are no observations at all, or none inside the window.
/// * [`ClimatologyError::InsufficientData`] if the data does not reach the end of the window.
pub(crate) fn reference_slice(
    observations: &ObservationSet,
    reference: &DateWindow,
) -> Result<ObservationSet, ClimatologyError> {
    let (Some(first), Some(last)) = (observations.first_date(), observations.last_date()) else {
        return Err(ClimatologyError::EmptyInput);
    };
    if last < reference.end() || first > reference.end() {
        return Err(ClimatologyError::InsufficientData {
            reference_end: reference.end(),
            first,
            last,
        });
    }
    let slice = observations.within(reference).without_leap_days();
    if slice.is_empty() {
        return Err(ClimatologyError::EmptyInput);
    }
    log::debug!(
        "Reference period {} to {} holds {} observations",
        reference.start(),
        reference.end(),
        slice.len()
    );
    Ok(slice)
}

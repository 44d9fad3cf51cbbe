pub mod day_of_year;
pub(crate) mod group_reduce;
pub mod month;

use crate::aggregate::group_reduce::{Reducer, Reduction};
use crate::types::observation::{Quantities, Quantity};

/// Reductions behind [`crate::SummaryStats`], limited to the quantities a set carries.
pub(crate) fn summary_reductions(quantities: Quantities) -> Vec<Reduction> {
    let mut reductions = vec![
        Reduction::new("tmean", Reducer::Mean, "tmean_mean"),
        Reduction::new("tmean", Reducer::Std, "tmean_std"),
        Reduction::new("tmean", Reducer::Max, "tmean_max"),
        Reduction::new("tmean", Reducer::Min, "tmean_min"),
        Reduction::new("tmax", Reducer::Max, "tmax_max"),
        Reduction::new("tmax", Reducer::Std, "tmax_std"),
        Reduction::new("tmin", Reducer::Min, "tmin_min"),
        Reduction::new("tmin", Reducer::Std, "tmin_std"),
    ];
    if quantities.has(Quantity::Snowfall) {
        reductions.push(Reduction::new("snow", Reducer::Mean, "snow_mean"));
    }
    reductions
}

use crate::error::ClimatologyError;
use crate::types::tables::{DailyBaseline, SummaryStats};

/// Centered moving average over a sequence that wraps from its end to its start.
///
/// Position `i` averages the `window` values centered on it, reading indices modulo the
/// sequence length, so Jan-1 sees late December and Dec-31 sees early January. A
/// window longer than the sequence wraps around it as many times as needed. A window
/// containing a missing value yields a missing value. Even windows have no center and
/// leave the input unchanged.
///
/// # Errors
///
/// Returns [`ClimatologyError::InvalidWindow`] if `window` is zero.
pub fn circular_moving_average(
    values: &[Option<f64>],
    window: usize,
) -> Result<Vec<Option<f64>>, ClimatologyError> {
    if window == 0 {
        return Err(ClimatologyError::InvalidWindow(window));
    }
    if window % 2 == 0 || values.is_empty() {
        return Ok(values.to_vec());
    }
    let n = values.len();
    let back = (window / 2) % n;
    let full_turns = window / n;
    let remainder = window % n;
    let turn_sum: Option<f64> = if full_turns > 0 {
        values.iter().copied().sum()
    } else {
        Some(0.0)
    };

    Ok((0..n)
        .map(|i| {
            let start = (i + n - back) % n;
            let partial: Option<f64> = (0..remainder).map(|k| values[(start + k) % n]).sum();
            Some(turn_sum? * full_turns as f64 + partial?).map(|sum| sum / window as f64)
        })
        .collect())
}

/// Smooths every statistic of a daily baseline along the calendar.
pub fn smooth_baseline(
    baseline: &DailyBaseline,
    window: usize,
) -> Result<DailyBaseline, ClimatologyError> {
    let keys: Vec<_> = baseline.iter().map(|(k, _)| *k).collect();
    let arrays: Vec<[Option<f64>; 9]> = baseline.iter().map(|(_, s)| s.to_array()).collect();

    let mut smoothed: Vec<[Option<f64>; 9]> = vec![[None; 9]; arrays.len()];
    for field in 0..SummaryStats::COLUMNS.len() {
        let column: Vec<Option<f64>> = arrays.iter().map(|a| a[field]).collect();
        for (row, value) in circular_moving_average(&column, window)?
            .into_iter()
            .enumerate()
        {
            smoothed[row][field] = value;
        }
    }
    Ok(DailyBaseline::new(
        keys.into_iter()
            .zip(smoothed.into_iter().map(SummaryStats::from_array))
            .collect(),
    ))
}

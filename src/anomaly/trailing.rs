use crate::error::ClimatologyError;

/// Rolling mean over the last `window` values, the current one included.
///
/// The first `window - 1` positions are `None`, as is every position whose window
/// holds a missing value. Nothing wraps around.
///
/// # Errors
///
/// Returns [`ClimatologyError::InvalidWindow`] if `window` is zero.
pub fn trailing_mean(
    values: &[Option<f64>],
    window: usize,
) -> Result<Vec<Option<f64>>, ClimatologyError> {
    if window == 0 {
        return Err(ClimatologyError::InvalidWindow(window));
    }
    Ok((0..values.len())
        .map(|end| {
            let start = (end + 1).checked_sub(window)?;
            values[start..=end]
                .iter()
                .copied()
                .sum::<Option<f64>>()
                .map(|sum| sum / window as f64)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_positions_are_undefined() -> Result<(), Box<dyn std::error::Error>> {
        let values = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        assert_eq!(
            trailing_mean(&values, 2)?,
            vec![None, Some(1.5), Some(2.5), Some(3.5)]
        );
        Ok(())
    }

    #[test]
    fn test_missing_value_poisons_its_windows() -> Result<(), Box<dyn std::error::Error>> {
        let values = [Some(1.0), None, Some(3.0), Some(5.0), Some(7.0)];
        assert_eq!(
            trailing_mean(&values, 2)?,
            vec![None, None, None, Some(4.0), Some(6.0)]
        );
        Ok(())
    }

    #[test]
    fn test_window_longer_than_series() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(trailing_mean(&[Some(1.0), Some(2.0)], 3)?, vec![None, None]);
        assert!(trailing_mean(&[], 3)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_zero_window_is_rejected() {
        assert!(matches!(
            trailing_mean(&[Some(1.0)], 0),
            Err(ClimatologyError::InvalidWindow(0))
        ));
    }
}

use serde::Serialize;

use crate::StatsError;

/// Precomputed percentile values for a dataset.
///
/// This structure stores percentile-value pairs for efficient lookup
/// of commonly used percentile points.
///
/// # Examples
///
/// ```
/// use estlab_stats::percentiles::Percentiles;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]).unwrap();
///
/// assert_eq!(percentiles.get(50.0), Some(3.0));
/// assert_eq!(percentiles.get(25.0), Some(2.0));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Percentiles {
    /// Percentile-value pairs in the order they were requested.
    /// Each tuple contains (percentile, value) where percentile is 0.0-100.0.
    values: Vec<(f64, f64)>,
}

impl Percentiles {
    /// Computes percentiles from sorted values.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `sorted_values` is not sorted in ascending order.
    pub fn from_sorted(
        sorted_values: &[f64],
        percentile_points: &[f64],
    ) -> Result<Self, StatsError> {
        let values = percentile_points
            .iter()
            .map(|&p| Ok((p, percentile_of_sorted(sorted_values, p)?)))
            .collect::<Result<_, StatsError>>()?;
        Ok(Self { values })
    }

    /// Computes percentiles from unsorted values.
    ///
    /// This method will sort a copy of the values before computing percentiles.
    pub fn new(values: &[f64], percentile_points: &[f64]) -> Result<Self, StatsError> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, percentile_points)
    }

    /// Gets the value at a specific percentile.
    ///
    /// Returns `None` if the percentile was not precomputed.
    #[must_use]
    pub fn get(&self, percentile: f64) -> Option<f64> {
        self.values
            .iter()
            .find(|(p, _)| (*p - percentile).abs() < f64::EPSILON)
            .map(|(_, value)| *value)
    }

    /// Returns an iterator over all (percentile, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values.iter().copied()
    }
}

/// Computes a single percentile from unsorted values.
///
/// Sorts a copy of `values` by [`f64::total_cmp`], then defers to
/// [`percentile_of_sorted`]. NaN values sort above every number.
///
/// # Examples
///
/// ```
/// use estlab_stats::percentiles::percentile;
///
/// let values = [3.0, 1.0, 4.0, 2.0];
/// assert_eq!(percentile(&values, 0.0).unwrap(), 1.0);
/// assert_eq!(percentile(&values, 50.0).unwrap(), 2.5);
/// assert_eq!(percentile(&values, 100.0).unwrap(), 4.0);
/// assert!(percentile(&values, 150.0).is_err());
/// ```
pub fn percentile(values: &[f64], p: f64) -> Result<f64, StatsError> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_of_sorted(&sorted, p)
}

/// Computes a single percentile from data sorted in ascending order.
///
/// The percentile `p` maps to the fractional rank `p / 100 * (n - 1)`, and the
/// result is linearly interpolated between the order statistics on either side
/// of that rank. `P0` is the minimum, `P100` the maximum and `P50` the median.
///
/// # Errors
///
/// * [`StatsError::EmptyCollection`] if `sorted_values` is empty
/// * [`StatsError::InvalidPercentile`] if `p` is outside `[0, 100]` or NaN
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
pub fn percentile_of_sorted(sorted_values: &[f64], p: f64) -> Result<f64, StatsError> {
    debug_assert!(
        sorted_values.is_sorted_by(|a, b| a.total_cmp(b).is_le()),
        "values must be sorted in ascending order"
    );
    if sorted_values.is_empty() {
        return Err(StatsError::EmptyCollection);
    }
    if !(0.0..=100.0).contains(&p) {
        return Err(StatsError::InvalidPercentile(p));
    }

    let rank = p / 100.0 * (sorted_values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let (lo_value, hi_value) = (sorted_values[lo], sorted_values[hi]);
    if lo == hi {
        return Ok(lo_value);
    }
    let frac = rank - lo as f64;
    Ok(lo_value + (hi_value - lo_value) * frac)
}

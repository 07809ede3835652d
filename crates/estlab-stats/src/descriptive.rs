use serde::Serialize;

use crate::StatsError;

/// Divisor applied to the sum of squared deviations when computing a variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceDivisor {
    /// Divide by `n`. Underestimates the population variance by a factor `(n - 1) / n`.
    Population,
    /// Divide by `n - 1` (Bessel's correction). Requires at least two values.
    Sample,
}

/// Computes the arithmetic mean.
///
/// # Examples
///
/// ```
/// # use estlab_stats::descriptive::mean;
/// assert_eq!(mean(&[1.0, 2.0, 6.0]).unwrap(), 3.0);
/// assert!(mean(&[]).is_err());
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Result<f64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptyCollection);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Computes the order-statistic median.
///
/// The values are copied and sorted by [`f64::total_cmp`], so NaN values sort
/// above every number. When the count is even, the two middle values are
/// averaged.
///
/// # Examples
///
/// ```
/// # use estlab_stats::descriptive::median;
/// assert_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
/// ```
pub fn median(values: &[f64]) -> Result<f64, StatsError> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    median_of_sorted(&sorted)
}

/// Computes the median of values already sorted in ascending order.
pub fn median_of_sorted(sorted_values: &[f64]) -> Result<f64, StatsError> {
    debug_assert!(
        sorted_values.is_sorted_by(|a, b| a.total_cmp(b).is_le()),
        "values must be sorted in ascending order"
    );
    let len = sorted_values.len();
    if len == 0 {
        return Err(StatsError::EmptyCollection);
    }
    let mid = len / 2;
    if len % 2 == 1 {
        Ok(sorted_values[mid])
    } else {
        // Same interpolation as the 50th percentile, so the two agree bit for bit.
        let (lo, hi) = (sorted_values[mid - 1], sorted_values[mid]);
        Ok(lo + (hi - lo) * 0.5)
    }
}

/// Computes the variance with the given divisor.
///
/// Uses two passes: the mean first, then the squared deviations from it.
///
/// # Examples
///
/// ```
/// # use estlab_stats::descriptive::{variance, VarianceDivisor};
/// let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert_eq!(variance(&values, VarianceDivisor::Population).unwrap(), 4.0);
/// assert_eq!(variance(&[1.0], VarianceDivisor::Population).unwrap(), 0.0);
/// assert!(variance(&[1.0], VarianceDivisor::Sample).is_err());
/// ```
#[expect(clippy::cast_precision_loss)]
pub fn variance(values: &[f64], divisor: VarianceDivisor) -> Result<f64, StatsError> {
    let required = match divisor {
        VarianceDivisor::Population => 1,
        VarianceDivisor::Sample => 2,
    };
    if values.is_empty() {
        return Err(StatsError::EmptyCollection);
    }
    if values.len() < required {
        return Err(StatsError::TooFewValues {
            required,
            actual: values.len(),
        });
    }

    let mean = mean(values)?;
    let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    let denom = match divisor {
        VarianceDivisor::Population => values.len(),
        VarianceDivisor::Sample => values.len() - 1,
    };
    Ok(sum_sq / denom as f64)
}

/// Descriptive statistics summarizing a dataset.
///
/// This structure contains common measures of central tendency and dispersion
/// for a dataset of `f64` values.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    /// The number of values in the dataset.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f64,
    /// The median value of the dataset.
    pub median: f64,
    /// The variance of the dataset (divisor `n`).
    pub variance: f64,
    /// The standard deviation of the dataset.
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// This method will sort the values internally before computing statistics.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use estlab_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// This skips the sorting step. Use this when you already have sorted data.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let mean = mean(sorted_values).ok()?;
        let median = median_of_sorted(sorted_values).ok()?;
        let variance = variance(sorted_values, VarianceDivisor::Population).ok()?;

        Some(Self {
            count: sorted_values.len(),
            min,
            max,
            mean,
            median,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[7.0]).unwrap(), 7.0);
        assert_eq!(median(&[5.0, 1.0, 3.0]).unwrap(), 3.0);
        assert_eq!(median(&[1.0, 2.0, 10.0, 20.0]).unwrap(), 6.0);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(mean(&[]), Err(StatsError::EmptyCollection));
        assert_eq!(median(&[]), Err(StatsError::EmptyCollection));
        assert_eq!(
            variance(&[], VarianceDivisor::Sample),
            Err(StatsError::EmptyCollection)
        );
        assert!(DescriptiveStats::new([]).is_none());
    }

    #[test]
    fn test_sample_variance_needs_two_values() {
        assert_eq!(
            variance(&[3.0], VarianceDivisor::Sample),
            Err(StatsError::TooFewValues {
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_variance_divisors() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let biased = variance(&values, VarianceDivisor::Population).unwrap();
        let unbiased = variance(&values, VarianceDivisor::Sample).unwrap();
        assert!((biased - 1.25).abs() < 1e-12);
        assert!((unbiased - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_variance_large_offset() {
        // Two-pass accumulation keeps the spread when the mean dwarfs it.
        let values = [1e9 + 1.0, 1e9 + 2.0, 1e9 + 3.0];
        let v = variance(&values, VarianceDivisor::Sample).unwrap();
        assert!((v - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_median_with_nan() {
        assert_eq!(median(&[1.0, f64::NAN, 2.0]).unwrap(), 2.0);
        assert!(median(&[1.0, f64::NAN]).unwrap().is_nan());
    }

    #[test]
    fn test_descriptive_stats() {
        let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.median, 2.5);
        assert!((stats.std_dev - 1.25_f64.sqrt()).abs() < 1e-12);
    }
}

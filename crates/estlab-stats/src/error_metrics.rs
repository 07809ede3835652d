//! Error metrics of an estimate collection against a known true value.
//!
//! Both metrics are computed from running means of the deviation `estimate - actual`
//! and of its square, updated one estimate at a time (Welford-style). This avoids
//! summing large squared terms before dividing, so the result stays accurate when
//! `actual` is large relative to the spread of the estimates.

use serde::Serialize;

use crate::StatsError;

/// Mean error and root-mean-squared error of a set of estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorSummary {
    /// Average of `estimate - actual`. Non-zero in the limit for a biased estimator.
    pub mean_error: f64,
    /// Square root of the average of `(estimate - actual)²`. Never negative.
    pub rmse: f64,
}

impl ErrorSummary {
    /// Computes both metrics in one pass.
    ///
    /// # Examples
    ///
    /// ```
    /// use estlab_stats::error_metrics::ErrorSummary;
    ///
    /// let summary = ErrorSummary::new(&[1.0, 2.0, 3.0], 1.0).unwrap();
    /// assert_eq!(summary.mean_error, 1.0);
    /// assert!((summary.rmse - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn new(estimates: &[f64], actual: f64) -> Result<Self, StatsError> {
        if estimates.is_empty() {
            return Err(StatsError::EmptyCollection);
        }

        let mut mean_dev = 0.0;
        let mut mean_sq_dev = 0.0;
        for (i, estimate) in estimates.iter().enumerate() {
            let dev = estimate - actual;
            let k = (i + 1) as f64;
            mean_dev += (dev - mean_dev) / k;
            mean_sq_dev += (dev * dev - mean_sq_dev) / k;
        }

        Ok(Self {
            mean_error: mean_dev,
            rmse: mean_sq_dev.sqrt(),
        })
    }
}

/// Average of `estimate - actual` over the collection.
///
/// # Examples
///
/// ```
/// use estlab_stats::error_metrics::mean_error;
///
/// assert_eq!(mean_error(&[3.0, 5.0], 2.0).unwrap(), 2.0);
/// assert!(mean_error(&[], 2.0).is_err());
/// ```
pub fn mean_error(estimates: &[f64], actual: f64) -> Result<f64, StatsError> {
    ErrorSummary::new(estimates, actual).map(|summary| summary.mean_error)
}

/// Root-mean-squared error of the collection against `actual`.
///
/// # Examples
///
/// ```
/// use estlab_stats::error_metrics::rmse;
///
/// assert_eq!(rmse(&[1.0, 5.0], 2.0).unwrap(), 5.0_f64.sqrt());
/// assert!(rmse(&[], 2.0).is_err());
/// ```
pub fn rmse(estimates: &[f64], actual: f64) -> Result<f64, StatsError> {
    ErrorSummary::new(estimates, actual).map(|summary| summary.rmse)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_empty_collection() {
        assert_eq!(mean_error(&[], 0.0), Err(StatsError::EmptyCollection));
        assert_eq!(rmse(&[], 1.0), Err(StatsError::EmptyCollection));
    }

    #[test]
    fn test_single_estimate() {
        let summary = ErrorSummary::new(&[2.5], 4.0).unwrap();
        assert_eq!(summary.mean_error, -1.5);
        assert_eq!(summary.rmse, 1.5);
    }

    #[test]
    fn test_large_true_value() {
        let actual = 1e12;
        let estimates = [actual + 1.0, actual - 1.0, actual + 1.0, actual - 1.0];
        let summary = ErrorSummary::new(&estimates, actual).unwrap();
        assert!(summary.mean_error.abs() < 1e-9);
        assert!((summary.rmse - 1.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn constant_estimates_have_zero_error(actual in -100.0..100.0_f64, len in 1_usize..64) {
            let estimates = vec![actual; len];
            let summary = ErrorSummary::new(&estimates, actual).unwrap();
            prop_assert_eq!(summary.mean_error, 0.0);
            prop_assert_eq!(summary.rmse, 0.0);
        }

        #[test]
        fn rmse_bounds_mean_error(
            estimates in prop::collection::vec(-100.0..100.0_f64, 1..64),
            actual in -100.0..100.0_f64,
        ) {
            let summary = ErrorSummary::new(&estimates, actual).unwrap();
            prop_assert!(summary.rmse >= 0.0);
            prop_assert!(summary.rmse + 1e-9 >= summary.mean_error.abs());
        }

        #[test]
        fn equal_estimates_give_rmse_equal_to_abs_mean_error(
            value in -100.0..100.0_f64,
            actual in -100.0..100.0_f64,
            len in 1_usize..64,
        ) {
            let summary = ErrorSummary::new(&vec![value; len], actual).unwrap();
            prop_assert!((summary.rmse - summary.mean_error.abs()).abs() < 1e-9);
        }
    }
}

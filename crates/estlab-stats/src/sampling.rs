//! Empirical sampling distribution of an estimator.
//!
//! Collecting one estimate per repetition and sorting the result gives an empirical
//! picture of how the estimator varies from sample to sample. Percentiles of that
//! picture yield confidence intervals without any distributional assumption, and
//! the RMSE against the true value is the estimator's standard error.

use serde::Serialize;

use crate::{
    StatsError,
    descriptive::{self, DescriptiveStats},
    error_metrics::ErrorSummary,
    percentiles::{self, Percentiles},
};

/// An estimate collection sorted in ascending order.
///
/// # Examples
///
/// ```
/// use estlab_stats::sampling::SamplingDistribution;
///
/// let dist = SamplingDistribution::new([3.0, 1.0, 2.0]).unwrap();
/// assert_eq!(dist.min(), 1.0);
/// assert_eq!(dist.max(), 3.0);
/// assert_eq!(dist.median(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct SamplingDistribution {
    sorted: Vec<f64>,
}

/// An empirical confidence interval read from a sampling distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    /// Confidence level in percent (e.g. `90.0`).
    pub level: f64,
    /// Value at percentile `(100 - level) / 2`.
    pub lower: f64,
    /// Value at percentile `100 - (100 - level) / 2`.
    pub upper: f64,
}

impl ConfidenceInterval {
    /// Returns `true` if `value` lies within `[lower, upper]`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    /// Returns `upper - lower`.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Error metrics and a confidence interval for one estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingSummary {
    /// Average deviation from the true value.
    pub mean_error: f64,
    /// RMSE against the true value, i.e. the standard error of the estimator.
    pub standard_error: f64,
    /// The 90% confidence interval (P5, P95).
    pub confidence_interval: ConfidenceInterval,
}

impl SamplingDistribution {
    /// Confidence level used by [`SamplingDistribution::summarize`].
    pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 90.0;

    /// Collects and sorts the estimates.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::EmptyCollection`] if `values` yields nothing.
    pub fn new<I>(values: I) -> Result<Self, StatsError>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        if sorted.is_empty() {
            return Err(StatsError::EmptyCollection);
        }
        sorted.sort_by(f64::total_cmp);
        Ok(Self { sorted })
    }

    /// Returns the number of estimates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Always `false`; an empty distribution cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Returns the estimates in ascending order.
    #[must_use]
    pub fn as_sorted(&self) -> &[f64] {
        &self.sorted
    }

    /// Returns the smallest estimate.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.sorted[0]
    }

    /// Returns the largest estimate.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.sorted[self.sorted.len() - 1]
    }

    /// Returns the median estimate.
    #[must_use]
    pub fn median(&self) -> f64 {
        // non-empty by construction
        descriptive::median_of_sorted(&self.sorted).unwrap_or(f64::NAN)
    }

    /// Returns the linearly interpolated value at percentile `p`.
    pub fn percentile(&self, p: f64) -> Result<f64, StatsError> {
        percentiles::percentile_of_sorted(&self.sorted, p)
    }

    /// Precomputes several percentiles at once.
    pub fn percentiles(&self, points: &[f64]) -> Result<Percentiles, StatsError> {
        Percentiles::from_sorted(&self.sorted, points)
    }

    /// Returns the central interval covering `level` percent of the estimates.
    ///
    /// A level of `90.0` yields the (P5, P95) pair.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidPercentile`] if `level` is outside `[0, 100]`.
    pub fn confidence_interval(&self, level: f64) -> Result<ConfidenceInterval, StatsError> {
        if !(0.0..=100.0).contains(&level) {
            return Err(StatsError::InvalidPercentile(level));
        }
        let tail = (100.0 - level) / 2.0;
        Ok(ConfidenceInterval {
            level,
            lower: self.percentile(tail)?,
            upper: self.percentile(100.0 - tail)?,
        })
    }

    /// Returns `(value, cumulative probability)` points of the empirical CDF.
    ///
    /// The `i`-th smallest estimate (zero-based) maps to probability `(i + 1) / n`,
    /// which is what a plotting collaborator needs to draw the step function.
    #[expect(clippy::cast_precision_loss)]
    pub fn cdf_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let n = self.sorted.len() as f64;
        self.sorted
            .iter()
            .enumerate()
            .map(move |(i, &value)| (value, (i + 1) as f64 / n))
    }

    /// Computes descriptive statistics of the estimates.
    #[must_use]
    pub fn descriptive(&self) -> DescriptiveStats {
        DescriptiveStats::from_sorted(&self.sorted)
            .unwrap_or_else(|| unreachable!("sampling distribution is never empty"))
    }

    /// Computes mean error, standard error and the 90% confidence interval
    /// against the true parameter value.
    pub fn summarize(&self, actual: f64) -> Result<SamplingSummary, StatsError> {
        let ErrorSummary { mean_error, rmse } = ErrorSummary::new(&self.sorted, actual)?;
        Ok(SamplingSummary {
            mean_error,
            standard_error: rmse,
            confidence_interval: self.confidence_interval(Self::DEFAULT_CONFIDENCE_LEVEL)?,
        })
    }
}

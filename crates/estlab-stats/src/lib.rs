//! Statistical reductions for Monte Carlo estimator evaluation.
//!
//! This crate turns collections of `f64` values into the scalars used to judge an
//! estimator: point summaries of a sample, error metrics against a known true value,
//! and percentile queries over an empirical sampling distribution.
//!
//! - **Descriptive statistics**: mean, median, biased and unbiased variance
//! - **Error metrics**: mean error and root-mean-squared error against a known value
//! - **Percentiles**: linearly interpolated percentiles of a dataset
//! - **Sampling distributions**: sorted estimate collections with confidence intervals
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`error_metrics`]: Mean error and RMSE of estimates against a true value
//! - [`percentiles`]: Percentile computation and storage
//! - [`sampling`]: Empirical sampling distribution of an estimator
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use estlab_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Measuring estimator error
//!
//! ```
//! use estlab_stats::error_metrics::{mean_error, rmse};
//!
//! let estimates = [1.0, 3.0];
//! assert_eq!(mean_error(&estimates, 2.0).unwrap(), 0.0);
//! assert_eq!(rmse(&estimates, 2.0).unwrap(), 1.0);
//! ```
//!
//! ## Building a confidence interval
//!
//! ```
//! use estlab_stats::sampling::SamplingDistribution;
//!
//! let estimates = (0..=100).map(f64::from);
//! let dist = SamplingDistribution::new(estimates).unwrap();
//! let ci = dist.confidence_interval(90.0).unwrap();
//! assert_eq!((ci.lower, ci.upper), (5.0, 95.0));
//! ```

pub mod descriptive;
pub mod error_metrics;
pub mod percentiles;
pub mod sampling;

/// Errors raised by the reductions in this crate.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum StatsError {
    /// The input collection contained no values.
    #[display("collection is empty")]
    EmptyCollection,
    /// The input collection is smaller than the reduction requires.
    #[display("at least {required} values required, got {actual}")]
    TooFewValues { required: usize, actual: usize },
    /// A percentile (or confidence level) outside `[0, 100]`.
    #[display("percentile {_0} is outside [0, 100]")]
    InvalidPercentile(#[error(not(source))] f64),
}

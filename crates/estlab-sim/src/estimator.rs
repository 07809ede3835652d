//! Estimators that map a sample to a single estimate.
//!
//! Every estimator is a pure function of its input sample. The set is closed and
//! named: [`Estimator::name`] gives the stable identifier used to parse estimators
//! from the command line and to key the driver's results.

use std::{f64::consts::LN_2, fmt, str::FromStr};

use estlab_stats::{
    StatsError,
    descriptive::{self, VarianceDivisor},
};
use serde::{Deserialize, Serialize};

use crate::{SimError, distribution::Distribution};

/// A named estimator of a population parameter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Estimator {
    /// Arithmetic mean; estimates the population mean.
    Mean,
    /// Order-statistic median; estimates the population mean of a symmetric
    /// distribution.
    Median,
    /// Sum of squared deviations divided by `n`; biased downward.
    BiasedVariance,
    /// Sum of squared deviations divided by `n - 1`; unbiased.
    UnbiasedVariance,
    /// `1 / mean`; estimates the rate of an exponential distribution.
    RateFromMean,
    /// `ln(2) / median`; estimates the rate of an exponential distribution.
    RateFromMedian,
}

impl Estimator {
    /// Every estimator, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Mean,
        Self::Median,
        Self::BiasedVariance,
        Self::UnbiasedVariance,
        Self::RateFromMean,
        Self::RateFromMedian,
    ];

    /// Returns the stable kebab-case identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::BiasedVariance => "biased-variance",
            Self::UnbiasedVariance => "unbiased-variance",
            Self::RateFromMean => "rate-from-mean",
            Self::RateFromMedian => "rate-from-median",
        }
    }

    /// Returns the smallest sample the estimator accepts.
    #[must_use]
    pub const fn min_sample_size(self) -> usize {
        match self {
            Self::BiasedVariance | Self::UnbiasedVariance => 2,
            Self::Mean | Self::Median | Self::RateFromMean | Self::RateFromMedian => 1,
        }
    }

    /// Returns the population parameter this estimator targets under `distribution`.
    ///
    /// Rate estimators have no target for a Gaussian population.
    ///
    /// # Examples
    ///
    /// ```
    /// use estlab_sim::{distribution::Distribution, estimator::Estimator};
    ///
    /// let exp = Distribution::exponential(2.0).unwrap();
    /// assert_eq!(Estimator::RateFromMedian.true_value(&exp), Some(2.0));
    /// assert_eq!(Estimator::Mean.true_value(&exp), Some(0.5));
    ///
    /// let normal = Distribution::gaussian(0.0, 3.0).unwrap();
    /// assert_eq!(Estimator::UnbiasedVariance.true_value(&normal), Some(9.0));
    /// assert_eq!(Estimator::RateFromMean.true_value(&normal), None);
    /// ```
    #[must_use]
    pub fn true_value(self, distribution: &Distribution) -> Option<f64> {
        match self {
            Self::Mean => Some(distribution.mean()),
            Self::Median => Some(distribution.median()),
            Self::BiasedVariance | Self::UnbiasedVariance => Some(distribution.variance()),
            Self::RateFromMean | Self::RateFromMedian => distribution.rate(),
        }
    }

    /// Computes the estimate from `sample`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Domain`] if the sample is smaller than
    /// [`Estimator::min_sample_size`], or if a rate estimator meets a sample whose
    /// mean or median is not strictly positive.
    ///
    /// # Examples
    ///
    /// ```
    /// use estlab_sim::estimator::Estimator;
    ///
    /// let sample = [1.0, 2.0, 3.0, 6.0];
    /// assert_eq!(Estimator::Mean.apply(&sample).unwrap(), 3.0);
    /// assert_eq!(Estimator::Median.apply(&sample).unwrap(), 2.5);
    /// assert_eq!(Estimator::BiasedVariance.apply(&sample).unwrap(), 3.5);
    /// assert_eq!(Estimator::RateFromMean.apply(&sample).unwrap(), 1.0 / 3.0);
    /// assert!(Estimator::UnbiasedVariance.apply(&[1.0]).is_err());
    /// ```
    pub fn apply(self, sample: &[f64]) -> Result<f64, SimError> {
        let required = self.min_sample_size();
        if sample.len() < required {
            return Err(self.domain_error(format!(
                "needs at least {required} values, got {}",
                sample.len()
            )));
        }

        let estimate = match self {
            Self::Mean => descriptive::mean(sample),
            Self::Median => descriptive::median(sample),
            Self::BiasedVariance => descriptive::variance(sample, VarianceDivisor::Population),
            Self::UnbiasedVariance => descriptive::variance(sample, VarianceDivisor::Sample),
            Self::RateFromMean => {
                let mean = descriptive::mean(sample).map_err(|e| self.stats_error(e))?;
                return self.reciprocal_rate(1.0, mean, "mean");
            }
            Self::RateFromMedian => {
                let median = descriptive::median(sample).map_err(|e| self.stats_error(e))?;
                return self.reciprocal_rate(LN_2, median, "median");
            }
        };
        estimate.map_err(|e| self.stats_error(e))
    }

    fn reciprocal_rate(
        self,
        numerator: f64,
        location: f64,
        what: &str,
    ) -> Result<f64, SimError> {
        if location > 0.0 {
            Ok(numerator / location)
        } else {
            Err(self.domain_error(format!(
                "sample {what} must be positive, got {location}"
            )))
        }
    }

    fn stats_error(self, error: StatsError) -> SimError {
        self.domain_error(error.to_string())
    }

    fn domain_error(self, reason: String) -> SimError {
        SimError::Domain {
            estimator: self.name(),
            reason,
        }
    }
}

impl fmt::Display for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown estimator name.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display(
    "unknown estimator `{name}` (expected one of: mean, median, biased-variance, \
     unbiased-variance, rate-from-mean, rate-from-median)"
)]
pub struct ParseEstimatorError {
    name: String,
}

impl FromStr for Estimator {
    type Err = ParseEstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseEstimatorError { name: s.to_owned() })
    }
}

//! Data-generating processes with known parameters.
//!
//! A [`Distribution`] describes a population whose true parameters are known, so
//! estimates computed from its samples can be compared against them. Parameters are
//! validated when the distribution is built, and again by [`Distribution::sampler`]
//! for values assembled by hand or deserialized.
//!
//! Sampling never touches a global generator: every draw goes through the `rng`
//! argument.

use std::f64::consts::LN_2;

use rand::Rng;
use rand_distr::{Exp, Normal};
use serde::{Deserialize, Serialize};

use crate::SimError;

/// A parametric population to draw samples from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "kebab-case")]
pub enum Distribution {
    /// Normal distribution with mean `mu` and standard deviation `sigma`.
    Gaussian { mu: f64, sigma: f64 },
    /// Exponential distribution with rate `lambda` (mean `1 / lambda`).
    Exponential { lambda: f64 },
}

impl Distribution {
    /// Builds a Gaussian distribution.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if `mu` is not finite or `sigma` is
    /// not a finite positive number.
    ///
    /// # Examples
    ///
    /// ```
    /// use estlab_sim::distribution::Distribution;
    ///
    /// assert!(Distribution::gaussian(90.0, 7.5).is_ok());
    /// assert!(Distribution::gaussian(0.0, 0.0).is_err());
    /// ```
    pub fn gaussian(mu: f64, sigma: f64) -> Result<Self, SimError> {
        let this = Self::Gaussian { mu, sigma };
        this.validate()?;
        Ok(this)
    }

    /// Builds an exponential distribution.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if `lambda` is not a finite positive
    /// number.
    pub fn exponential(lambda: f64) -> Result<Self, SimError> {
        let this = Self::Exponential { lambda };
        this.validate()?;
        Ok(this)
    }

    /// Checks that every parameter is in its domain.
    pub fn validate(&self) -> Result<(), SimError> {
        match *self {
            Self::Gaussian { mu, sigma } => {
                if !mu.is_finite() {
                    return Err(SimError::invalid_parameter(
                        "mu",
                        format!("must be finite, got {mu}"),
                    ));
                }
                check_positive("sigma", sigma)
            }
            Self::Exponential { lambda } => check_positive("lambda", lambda),
        }
    }

    /// Returns the population mean.
    #[must_use]
    pub fn mean(&self) -> f64 {
        match *self {
            Self::Gaussian { mu, .. } => mu,
            Self::Exponential { lambda } => 1.0 / lambda,
        }
    }

    /// Returns the population median.
    #[must_use]
    pub fn median(&self) -> f64 {
        match *self {
            Self::Gaussian { mu, .. } => mu,
            Self::Exponential { lambda } => LN_2 / lambda,
        }
    }

    /// Returns the population variance.
    #[must_use]
    pub fn variance(&self) -> f64 {
        match *self {
            Self::Gaussian { sigma, .. } => sigma * sigma,
            Self::Exponential { lambda } => 1.0 / (lambda * lambda),
        }
    }

    /// Returns the rate parameter of an exponential distribution.
    #[must_use]
    pub fn rate(&self) -> Option<f64> {
        match *self {
            Self::Gaussian { .. } => None,
            Self::Exponential { lambda } => Some(lambda),
        }
    }

    /// Builds a reusable sampler for this distribution.
    pub fn sampler(&self) -> Result<Sampler, SimError> {
        self.validate()?;
        let inner = match *self {
            Self::Gaussian { mu, sigma } => Normal::new(mu, sigma)
                .map(SamplerInner::Gaussian)
                .map_err(|e| SimError::invalid_parameter("sigma", e.to_string()))?,
            Self::Exponential { lambda } => Exp::new(lambda)
                .map(SamplerInner::Exponential)
                .map_err(|e| SimError::invalid_parameter("lambda", e.to_string()))?,
        };
        Ok(Sampler { inner })
    }

    /// Draws `n` independent values.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if `n` is zero or a parameter is out
    /// of domain.
    ///
    /// # Examples
    ///
    /// ```
    /// use estlab_sim::distribution::Distribution;
    /// use rand::SeedableRng as _;
    /// use rand_pcg::Pcg64;
    ///
    /// let mut rng = Pcg64::seed_from_u64(1);
    /// let dist = Distribution::exponential(2.0).unwrap();
    /// let sample = dist.sample(10, &mut rng).unwrap();
    /// assert_eq!(sample.len(), 10);
    /// assert!(sample.iter().all(|&x| x >= 0.0));
    /// assert!(dist.sample(0, &mut rng).is_err());
    /// ```
    pub fn sample<R>(&self, n: usize, rng: &mut R) -> Result<Vec<f64>, SimError>
    where
        R: Rng + ?Sized,
    {
        self.sampler()?.sample_n(n, rng)
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid_parameter(
            name,
            format!("must be finite and positive, got {value}"),
        ))
    }
}

/// A validated distribution ready to draw from.
#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    inner: SamplerInner,
}

#[derive(Debug, Clone, Copy)]
enum SamplerInner {
    Gaussian(Normal<f64>),
    Exponential(Exp<f64>),
}

impl Sampler {
    /// Draws `n` independent values into a fresh vector.
    pub fn sample_n<R>(&self, n: usize, rng: &mut R) -> Result<Vec<f64>, SimError>
    where
        R: Rng + ?Sized,
    {
        if n == 0 {
            return Err(SimError::invalid_parameter(
                "sample_size",
                "must be at least 1",
            ));
        }
        Ok((0..n)
            .map(|_| rand_distr::Distribution::sample(self, rng))
            .collect())
    }
}

impl rand_distr::Distribution<f64> for Sampler {
    fn sample<R>(&self, rng: &mut R) -> f64
    where
        R: Rng + ?Sized,
    {
        match &self.inner {
            SamplerInner::Gaussian(normal) => rand_distr::Distribution::sample(normal, rng),
            SamplerInner::Exponential(exp) => rand_distr::Distribution::sample(exp, rng),
        }
    }
}

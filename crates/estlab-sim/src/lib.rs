//! Monte Carlo harness for evaluating statistical estimators.
//!
//! An experiment repeatedly draws a fresh sample from a known distribution, applies
//! one or more estimators to it, and collects one estimate per repetition. The
//! collections are then reduced with [`estlab_stats`] to mean error, RMSE and
//! empirical confidence intervals.
//!
//! # Architecture
//!
//! ```text
//! Distribution (Gaussian, Exponential)
//!     ↓ draws a sample per repetition
//! Estimator (mean, median, variance, rate)
//!     ↓ one estimate per repetition
//! Repetition driver (seeded, optionally threaded)
//!     ↓ estimate collections
//! estlab-stats (mean error, RMSE, percentiles)
//! ```
//!
//! The goal-scoring game ([`game`]) does not fit the sample-then-estimate shape:
//! its estimate comes out of the simulation itself. It shares the repetition
//! driver through [`driver::repeat`].
//!
//! # Reproducibility
//!
//! No function in this crate touches a global random source. Every draw goes through
//! a generator passed by the caller, and the driver derives the generator of
//! repetition `k` from the experiment seed and `k` alone. The same seed therefore
//! yields the same estimates for any thread count.
//!
//! # Example
//!
//! ```
//! use estlab_sim::{
//!     distribution::Distribution,
//!     driver::Experiment,
//!     estimator::Estimator,
//! };
//! use estlab_stats::error_metrics::rmse;
//!
//! let experiment = Experiment {
//!     distribution: Distribution::gaussian(0.0, 1.0).unwrap(),
//!     sample_size: 7,
//!     iterations: 1000,
//!     estimators: vec![Estimator::Mean, Estimator::Median],
//!     seed: 17,
//!     threads: 1,
//! };
//! let table = experiment.run().unwrap();
//! let mean_rmse = rmse(table.get(Estimator::Mean).unwrap(), 0.0).unwrap();
//! let median_rmse = rmse(table.get(Estimator::Median).unwrap(), 0.0).unwrap();
//! assert!(mean_rmse < median_rmse);
//! ```

use estlab_stats::StatsError;

pub mod distribution;
pub mod driver;
pub mod estimator;
pub mod game;

/// Errors raised while configuring or running an experiment.
#[derive(
    Debug,
    Clone,
    PartialEq,
    derive_more::Display,
    derive_more::Error,
    derive_more::From,
    derive_more::IsVariant,
)]
pub enum SimError {
    /// A distribution parameter, sample size or repetition count is out of domain.
    #[display("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },
    /// An estimator was applied to a sample it cannot handle.
    #[display("estimator `{estimator}` cannot be applied: {reason}")]
    Domain {
        estimator: &'static str,
        reason: String,
    },
    /// A statistical reduction failed.
    #[display("{_0}")]
    #[from]
    Stats(StatsError),
    /// The goal-scoring game exceeded its event cap without reaching the end of the game.
    #[display("game simulation did not finish within {max_events} events (lambda = {lambda})")]
    SimulationDivergence { lambda: f64, max_events: usize },
}

impl SimError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

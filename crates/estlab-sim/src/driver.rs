//! Repetition driver for Monte Carlo experiments.
//!
//! An experiment is a fixed number of independent repetitions. Each repetition owns a
//! private generator derived from the experiment seed and the repetition index, draws
//! a fresh sample, and applies every requested estimator to it. The estimates are
//! collected per estimator in repetition order.
//!
//! # Parallelization
//!
//! Repetitions share no state, so they can be split across scoped threads. Each
//! worker takes a contiguous range of repetition indices and the ranges are joined
//! back in order. Since a repetition's generator depends only on the seed and its
//! index, the output is identical for every thread count.
//!
//! # Failure
//!
//! The first error raised by any repetition aborts the run. No partial table is
//! returned.

use std::{num::NonZeroUsize, panic, thread};

use estlab_stats::{
    error_metrics::ErrorSummary,
    sampling::{SamplingDistribution, SamplingSummary},
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{SimError, distribution::Distribution, estimator::Estimator, game};

/// Derives the generator of each repetition from an experiment seed.
///
/// All repetitions share one 128-bit PCG state expanded from the seed and differ in
/// their stream (increment), which is the repetition index.
#[derive(Debug, Clone, Copy)]
pub struct RepetitionSeeder {
    state: u128,
}

impl RepetitionSeeder {
    /// Expands `seed` into the shared generator state.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let state = Pcg64::seed_from_u64(seed).random::<u128>();
        Self { state }
    }

    /// Returns the generator of repetition `index`.
    #[must_use]
    pub fn rng(&self, index: usize) -> Pcg64 {
        Pcg64::new(self.state, index as u128)
    }
}

/// Runs `f` once per repetition and collects the results in repetition order.
///
/// `threads` selects the number of worker threads; `0` uses the available
/// parallelism of the machine. The result does not depend on `threads`.
///
/// # Errors
///
/// Returns [`SimError::InvalidParameter`] if `iterations` is zero, or the first
/// error returned by `f`.
///
/// # Examples
///
/// ```
/// use estlab_sim::driver::repeat;
/// use rand::Rng as _;
///
/// let serial = repeat(100, 5, 1, |rng| Ok(rng.random::<f64>())).unwrap();
/// let parallel = repeat(100, 5, 4, |rng| Ok(rng.random::<f64>())).unwrap();
/// assert_eq!(serial, parallel);
/// ```
pub fn repeat<T, F>(
    iterations: usize,
    seed: u64,
    threads: usize,
    f: F,
) -> Result<Vec<T>, SimError>
where
    T: Send,
    F: Fn(&mut Pcg64) -> Result<T, SimError> + Sync,
{
    if iterations == 0 {
        return Err(SimError::invalid_parameter(
            "iterations",
            "must be at least 1",
        ));
    }
    let seeder = RepetitionSeeder::new(seed);
    let threads = resolve_threads(threads).min(iterations);

    if threads == 1 {
        return (0..iterations).map(|k| f(&mut seeder.rng(k))).collect();
    }

    let chunk_size = iterations.div_ceil(threads);
    let f = &f;
    thread::scope(|s| -> Result<Vec<T>, SimError> {
        let handles = (0..iterations)
            .step_by(chunk_size)
            .map(|start| {
                let end = (start + chunk_size).min(iterations);
                s.spawn(move || {
                    trace!(start, end, "worker started");
                    (start..end)
                        .map(|k| f(&mut seeder.rng(k)))
                        .collect::<Result<Vec<_>, _>>()
                })
            })
            .collect::<Vec<_>>();

        let mut results = Vec::with_capacity(iterations);
        for handle in handles {
            let chunk = handle
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload))?;
            results.extend(chunk);
        }
        Ok(results)
    })
}

fn resolve_threads(threads: usize) -> usize {
    if threads == 0 {
        thread::available_parallelism().map_or(1, NonZeroUsize::get)
    } else {
        threads
    }
}

/// A sample-then-estimate experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Population to draw samples from.
    pub distribution: Distribution,
    /// Number of values per sample (`n`).
    pub sample_size: usize,
    /// Number of repetitions.
    pub iterations: usize,
    /// Estimators applied to every sample, without duplicates.
    pub estimators: Vec<Estimator>,
    /// Seed for the repetition generators.
    pub seed: u64,
    /// Worker thread count; `0` uses the available parallelism.
    pub threads: usize,
}

impl Experiment {
    /// Runs every repetition and collects one estimate per repetition and estimator.
    ///
    /// # Errors
    ///
    /// * [`SimError::InvalidParameter`] for an out-of-domain distribution, a zero
    ///   sample size or iteration count, or an empty or duplicated estimator list
    /// * [`SimError::Domain`] if an estimator rejects a sample
    pub fn run(&self) -> Result<EstimateTable, SimError> {
        self.validate()?;
        let sampler = self.distribution.sampler()?;
        debug!(
            distribution = ?self.distribution,
            sample_size = self.sample_size,
            iterations = self.iterations,
            estimators = ?self.estimators,
            seed = self.seed,
            "running experiment"
        );

        let rows = repeat(self.iterations, self.seed, self.threads, |rng| {
            let sample = sampler.sample_n(self.sample_size, rng)?;
            self.estimators
                .iter()
                .map(|estimator| estimator.apply(&sample))
                .collect::<Result<Vec<_>, _>>()
        })?;

        let mut columns = self
            .estimators
            .iter()
            .map(|&estimator| EstimateColumn {
                estimator,
                estimates: Vec::with_capacity(self.iterations),
            })
            .collect::<Vec<_>>();
        for row in rows {
            for (column, estimate) in columns.iter_mut().zip(row) {
                column.estimates.push(estimate);
            }
        }
        debug!(columns = columns.len(), "experiment finished");
        Ok(EstimateTable { columns })
    }

    fn validate(&self) -> Result<(), SimError> {
        self.distribution.validate()?;
        if self.sample_size == 0 {
            return Err(SimError::invalid_parameter(
                "sample_size",
                "must be at least 1",
            ));
        }
        if self.iterations == 0 {
            return Err(SimError::invalid_parameter(
                "iterations",
                "must be at least 1",
            ));
        }
        if self.estimators.is_empty() {
            return Err(SimError::invalid_parameter(
                "estimators",
                "at least one estimator is required",
            ));
        }
        for (i, estimator) in self.estimators.iter().enumerate() {
            if self.estimators[..i].contains(estimator) {
                return Err(SimError::invalid_parameter(
                    "estimators",
                    format!("`{estimator}` is listed more than once"),
                ));
            }
        }
        Ok(())
    }
}

/// Estimates of one estimator, in repetition order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateColumn {
    pub estimator: Estimator,
    pub estimates: Vec<f64>,
}

/// The estimate collections produced by [`Experiment::run`], one per estimator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EstimateTable {
    columns: Vec<EstimateColumn>,
}

impl EstimateTable {
    /// Returns the estimates of `estimator`, if it was part of the experiment.
    #[must_use]
    pub fn get(&self, estimator: Estimator) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|column| column.estimator == estimator)
            .map(|column| column.estimates.as_slice())
    }

    /// Looks an estimator's collection up by its name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&[f64]> {
        name.parse().ok().and_then(|estimator| self.get(estimator))
    }

    /// Returns all columns in the order the estimators were requested.
    #[must_use]
    pub fn columns(&self) -> &[EstimateColumn] {
        &self.columns
    }

    /// Computes mean error and RMSE of `estimator` against `actual`.
    pub fn error_summary(
        &self,
        estimator: Estimator,
        actual: f64,
    ) -> Result<ErrorSummary, SimError> {
        let estimates = self.require(estimator)?;
        Ok(ErrorSummary::new(estimates, actual)?)
    }

    /// Builds the empirical sampling distribution of `estimator`.
    pub fn sampling_distribution(
        &self,
        estimator: Estimator,
    ) -> Result<SamplingDistribution, SimError> {
        let estimates = self.require(estimator)?;
        Ok(SamplingDistribution::new(estimates.iter().copied())?)
    }

    /// Computes mean error, standard error and 90% confidence interval of
    /// `estimator` against `actual`.
    pub fn summarize(
        &self,
        estimator: Estimator,
        actual: f64,
    ) -> Result<SamplingSummary, SimError> {
        Ok(self.sampling_distribution(estimator)?.summarize(actual)?)
    }

    fn require(&self, estimator: Estimator) -> Result<&[f64], SimError> {
        self.get(estimator).ok_or_else(|| {
            SimError::invalid_parameter(
                "estimator",
                format!("`{estimator}` was not part of the experiment"),
            )
        })
    }
}

/// Repeated games of the goal-scoring simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameExperiment {
    /// True goal rate per game.
    pub lambda: f64,
    /// Number of games.
    pub iterations: usize,
    /// Seed for the repetition generators.
    pub seed: u64,
    /// Worker thread count; `0` uses the available parallelism.
    pub threads: usize,
}

impl GameExperiment {
    /// Plays every game and returns the goal counts as estimates of `lambda`.
    pub fn run(&self) -> Result<Vec<f64>, SimError> {
        debug!(
            lambda = self.lambda,
            iterations = self.iterations,
            seed = self.seed,
            "running goal game experiment"
        );
        repeat(self.iterations, self.seed, self.threads, |rng| {
            game::simulate_game(self.lambda, rng).map(f64::from)
        })
    }
}

/// Error metrics of one estimator at one sample size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub sample_size: usize,
    pub mean_error: f64,
    pub rmse: f64,
}

/// Measures how the error of `estimator` shrinks as the sample size grows.
///
/// Runs one experiment per entry of `sample_sizes`, all with the same seed, and
/// reports mean error and RMSE against `actual` for each.
pub fn sweep_sample_sizes(
    distribution: Distribution,
    estimator: Estimator,
    actual: f64,
    sample_sizes: &[usize],
    iterations: usize,
    seed: u64,
    threads: usize,
) -> Result<Vec<SweepPoint>, SimError> {
    sample_sizes
        .iter()
        .map(|&sample_size| {
            let experiment = Experiment {
                distribution,
                sample_size,
                iterations,
                estimators: vec![estimator],
                seed,
                threads,
            };
            let ErrorSummary { mean_error, rmse } =
                experiment.run()?.error_summary(estimator, actual)?;
            Ok(SweepPoint {
                sample_size,
                mean_error,
                rmse,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn gaussian_experiment(iterations: usize, threads: usize) -> Experiment {
        Experiment {
            distribution: Distribution::gaussian(0.0, 1.0).unwrap(),
            sample_size: 7,
            iterations,
            estimators: vec![Estimator::Mean, Estimator::Median],
            seed: 1234,
            threads,
        }
    }

    #[test]
    fn test_collection_lengths_match_iterations() {
        let table = gaussian_experiment(250, 1).run().unwrap();
        assert_eq!(table.columns().len(), 2);
        for column in table.columns() {
            assert_eq!(column.estimates.len(), 250);
        }
        assert_eq!(
            table
                .columns()
                .iter()
                .map(|c| c.estimator)
                .collect::<Vec<_>>(),
            vec![Estimator::Mean, Estimator::Median]
        );
    }

    #[test]
    fn test_thread_count_does_not_change_results() {
        let serial = gaussian_experiment(101, 1).run().unwrap();
        for threads in [2, 3, 8, 0] {
            assert_eq!(gaussian_experiment(101, threads).run().unwrap(), serial);
        }
    }

    #[test]
    fn test_seed_changes_results() {
        let a = gaussian_experiment(10, 1).run().unwrap();
        let mut other = gaussian_experiment(10, 1);
        other.seed += 1;
        assert_ne!(other.run().unwrap(), a);
    }

    #[test]
    fn test_repetitions_get_distinct_generators() {
        let seeder = RepetitionSeeder::new(0);
        let first = seeder.rng(0).random::<u64>();
        let second = seeder.rng(1).random::<u64>();
        assert_ne!(first, second);
        assert_eq!(seeder.rng(1).random::<u64>(), second);
    }

    #[test]
    fn test_single_iteration() {
        let mut experiment = gaussian_experiment(1, 1);
        experiment.estimators = vec![Estimator::Mean];
        let table = experiment.run().unwrap();
        let estimate = table.get(Estimator::Mean).unwrap()[0];
        let summary = table.error_summary(Estimator::Mean, 0.5).unwrap();
        assert_eq!(summary.mean_error, estimate - 0.5);
        assert_eq!(summary.rmse, (estimate - 0.5).abs());
    }

    #[test]
    fn test_invalid_configuration() {
        let mut experiment = gaussian_experiment(0, 1);
        assert!(experiment.run().unwrap_err().is_invalid_parameter());

        experiment.iterations = 10;
        experiment.sample_size = 0;
        assert!(experiment.run().unwrap_err().is_invalid_parameter());

        experiment.sample_size = 7;
        experiment.estimators.clear();
        assert!(experiment.run().unwrap_err().is_invalid_parameter());

        experiment.estimators = vec![Estimator::Mean, Estimator::Mean];
        assert!(experiment.run().unwrap_err().is_invalid_parameter());

        experiment.estimators = vec![Estimator::Mean];
        experiment.distribution = Distribution::Gaussian {
            mu: 0.0,
            sigma: 0.0,
        };
        assert!(experiment.run().unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_estimator_error_aborts_run() {
        let experiment = Experiment {
            distribution: Distribution::exponential(1.0).unwrap(),
            sample_size: 1,
            iterations: 20,
            estimators: vec![Estimator::Mean, Estimator::UnbiasedVariance],
            seed: 0,
            threads: 4,
        };
        assert!(experiment.run().unwrap_err().is_domain());
    }

    #[test]
    fn test_lookup_by_name() {
        let table = gaussian_experiment(5, 1).run().unwrap();
        assert_eq!(table.get_by_name("median"), table.get(Estimator::Median));
        assert!(table.get_by_name("biased-variance").is_none());
        assert!(table.get_by_name("nonsense").is_none());
        assert!(
            table
                .summarize(Estimator::RateFromMean, 1.0)
                .unwrap_err()
                .is_invalid_parameter()
        );
    }

    #[test]
    fn test_summarize() {
        let table = gaussian_experiment(1000, 2).run().unwrap();
        let summary = table.summarize(Estimator::Mean, 0.0).unwrap();
        let ci = summary.confidence_interval;
        assert!(ci.lower < 0.0 && 0.0 < ci.upper);
        // The standard error of the mean of 7 draws is 1 / sqrt(7).
        assert!((summary.standard_error - 7.0_f64.sqrt().recip()).abs() < 0.05);
    }

    #[test]
    fn test_game_experiment() {
        let experiment = GameExperiment {
            lambda: 2.0,
            iterations: 500,
            seed: 3,
            threads: 2,
        };
        let counts = experiment.run().unwrap();
        assert_eq!(counts.len(), 500);
        assert!(counts.iter().all(|c| c.fract() == 0.0 && *c >= 0.0));

        let invalid = GameExperiment {
            lambda: -2.0,
            ..experiment
        };
        assert!(invalid.run().unwrap_err().is_invalid_parameter());
    }

    #[test]
    fn test_sweep_rmse_shrinks() {
        let points = sweep_sample_sizes(
            Distribution::exponential(2.0).unwrap(),
            Estimator::RateFromMean,
            2.0,
            &[4, 64],
            2000,
            8,
            1,
        )
        .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].sample_size, 4);
        assert!(points[1].rmse < points[0].rmse);
    }

    #[test]
    fn test_table_serializes_as_list() {
        let table = gaussian_experiment(2, 1).run().unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["estimator"], "mean");
        assert_eq!(json[1]["estimates"].as_array().unwrap().len(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn repeat_ignores_thread_count(
            iterations in 1_usize..200,
            seed in any::<u64>(),
            threads in 0_usize..=8,
        ) {
            let draw = |rng: &mut Pcg64| Ok::<_, SimError>(rng.random::<u64>());
            let serial = repeat(iterations, seed, 1, draw).unwrap();
            let parallel = repeat(iterations, seed, threads, draw).unwrap();
            prop_assert_eq!(serial, parallel);
        }

        #[test]
        fn every_column_has_one_estimate_per_iteration(
            iterations in 1_usize..100,
            sample_size in 2_usize..16,
            seed in any::<u64>(),
        ) {
            let experiment = Experiment {
                distribution: Distribution::exponential(2.0).unwrap(),
                sample_size,
                iterations,
                estimators: Estimator::ALL.to_vec(),
                seed,
                threads: 2,
            };
            let table = experiment.run().unwrap();
            prop_assert_eq!(table.columns().len(), Estimator::ALL.len());
            for column in table.columns() {
                prop_assert_eq!(column.estimates.len(), iterations);
            }
        }
    }
}

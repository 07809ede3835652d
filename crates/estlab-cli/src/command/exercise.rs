use std::time::Instant;

use clap::ValueEnum;
use estlab_sim::{
    distribution::Distribution,
    driver::{self, Experiment, GameExperiment},
    estimator::Estimator,
};
use serde::Serialize;
use tracing::info;

use crate::report::{EstimatorReport, Report};

use super::CommonArg;

const DEFAULT_ITERATIONS: usize = 1000;
const SAMPLE_SIZE: usize = 7;
const EXPONENTIAL_RATE: f64 = 2.0;
const SCORES_MEAN: f64 = 90.0;
const SCORES_STD_DEV: f64 = 7.5;
const SCORES_SAMPLE_SIZE: usize = 9;
const SWEEP_SAMPLE_SIZES: [usize; 7] = [2, 4, 8, 16, 32, 64, 128];
const GOAL_RATE: f64 = 2.0;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ExerciseArg {
    /// Exercise to run
    #[arg(value_enum)]
    exercise: Exercise,
    /// Number of repetitions
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,
    #[clap(flatten)]
    pub(super) common: CommonArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Exercise {
    /// Sample mean versus sample median of a standard Gaussian
    MeanVsMedian,
    /// Biased versus unbiased variance of a standard Gaussian
    Variance,
    /// Rate of an exponential from the sample mean and from the sample median
    ExponentialRate,
    /// Sampling distribution of the mean of test scores
    SamplingDistribution,
    /// Error of the rate-from-mean estimator over growing sample sizes
    StandardErrorSweep,
    /// Estimate a goal-scoring rate from single games
    Goals,
}

pub(crate) fn run(arg: &ExerciseArg) -> anyhow::Result<()> {
    let seed = arg.common.seed();
    let start = Instant::now();
    let report = match arg.exercise {
        Exercise::MeanVsMedian => {
            let distribution = Distribution::gaussian(0.0, 1.0)?;
            estimators_report(
                "mean vs median",
                arg,
                seed,
                distribution,
                SAMPLE_SIZE,
                &[Estimator::Mean, Estimator::Median],
            )?
        }
        Exercise::Variance => {
            let distribution = Distribution::gaussian(0.0, 1.0)?;
            estimators_report(
                "variance",
                arg,
                seed,
                distribution,
                SAMPLE_SIZE,
                &[Estimator::BiasedVariance, Estimator::UnbiasedVariance],
            )?
        }
        Exercise::ExponentialRate => {
            let distribution = Distribution::exponential(EXPONENTIAL_RATE)?;
            estimators_report(
                "exponential rate",
                arg,
                seed,
                distribution,
                SAMPLE_SIZE,
                &[Estimator::RateFromMean, Estimator::RateFromMedian],
            )?
        }
        Exercise::SamplingDistribution => {
            let distribution = Distribution::gaussian(SCORES_MEAN, SCORES_STD_DEV)?;
            estimators_report(
                "sampling distribution",
                arg,
                seed,
                distribution,
                SCORES_SAMPLE_SIZE,
                &[Estimator::Mean],
            )?
        }
        Exercise::StandardErrorSweep => sweep_report(arg, seed)?,
        Exercise::Goals => goals_report(arg, seed)?,
    };
    info!(
        exercise = %report.title,
        elapsed = ?start.elapsed(),
        "exercise finished"
    );
    arg.common.emit(&report)
}

fn estimators_report(
    title: &str,
    arg: &ExerciseArg,
    seed: u64,
    distribution: Distribution,
    sample_size: usize,
    estimators: &[Estimator],
) -> anyhow::Result<Report> {
    let experiment = Experiment {
        distribution,
        sample_size,
        iterations: arg.iterations,
        estimators: estimators.to_vec(),
        seed,
        threads: arg.common.threads(),
    };
    let actuals = estimators
        .iter()
        .map(|&estimator| {
            let actual = estimator.true_value(&distribution).ok_or_else(|| {
                anyhow::anyhow!("{estimator} has no true value under {distribution:?}")
            })?;
            Ok((estimator, actual))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    super::experiment_report(title, &experiment, &actuals, &arg.common)
}

#[derive(Debug, Serialize)]
struct SweepSetup {
    distribution: Distribution,
    estimator: Estimator,
    actual: f64,
    iterations: usize,
    seed: u64,
}

fn sweep_report(arg: &ExerciseArg, seed: u64) -> anyhow::Result<Report> {
    let distribution = Distribution::exponential(EXPONENTIAL_RATE)?;
    let estimator = Estimator::RateFromMean;
    let setup = SweepSetup {
        distribution,
        estimator,
        actual: EXPONENTIAL_RATE,
        iterations: arg.iterations,
        seed,
    };
    let mut report = Report::new("standard error sweep", &setup)?;
    report.sweep = driver::sweep_sample_sizes(
        distribution,
        estimator,
        EXPONENTIAL_RATE,
        &SWEEP_SAMPLE_SIZES,
        arg.iterations,
        seed,
        arg.common.threads(),
    )?;
    Ok(report)
}

fn goals_report(arg: &ExerciseArg, seed: u64) -> anyhow::Result<Report> {
    let experiment = GameExperiment {
        lambda: GOAL_RATE,
        iterations: arg.iterations,
        seed,
        threads: arg.common.threads(),
    };
    let goals = experiment.run()?;
    let mut report = Report::new("goals", &experiment)?;
    report.estimators.push(EstimatorReport::new(
        "goals-per-game",
        &goals,
        GOAL_RATE,
        arg.common.cdf,
    )?);
    Ok(report)
}

use std::path::PathBuf;

use anyhow::Context as _;
use clap::ValueEnum;
use estlab_sim::{distribution::Distribution, driver::Experiment, estimator::Estimator};
use tracing::info;

use crate::util;

use super::CommonArg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Family {
    Gaussian,
    Exponential,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    /// Experiment JSON file; replaces the distribution and sampling flags
    #[arg(long)]
    config: Option<PathBuf>,
    /// Population to sample from
    #[arg(long, value_enum, default_value_t = Family::Gaussian)]
    distribution: Family,
    /// Gaussian mean
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    mu: f64,
    /// Gaussian standard deviation
    #[arg(long, default_value_t = 1.0)]
    sigma: f64,
    /// Exponential rate
    #[arg(long, default_value_t = 2.0)]
    lambda: f64,
    /// Number of observations per sample
    #[arg(short = 'n', long, default_value_t = 7)]
    sample_size: usize,
    /// Number of repetitions
    #[arg(long, default_value_t = 1000)]
    iterations: usize,
    /// Estimators to evaluate (repeatable or comma separated)
    #[arg(
        long = "estimator",
        value_delimiter = ',',
        default_values_t = [Estimator::Mean, Estimator::Median]
    )]
    pub(super) estimators: Vec<Estimator>,
    /// True parameter value (defaults to the population value each estimator targets)
    #[arg(long, allow_negative_numbers = true)]
    actual: Option<f64>,
    #[clap(flatten)]
    pub(super) common: CommonArg,
}

impl RunArg {
    fn experiment(&self) -> anyhow::Result<Experiment> {
        if let Some(path) = &self.config {
            let mut experiment: Experiment = util::read_json_file("experiment", path)?;
            self.override_config(&mut experiment);
            return Ok(experiment);
        }

        let distribution = match self.distribution {
            Family::Gaussian => Distribution::gaussian(self.mu, self.sigma)?,
            Family::Exponential => Distribution::exponential(self.lambda)?,
        };
        Ok(Experiment {
            distribution,
            sample_size: self.sample_size,
            iterations: self.iterations,
            estimators: self.estimators.clone(),
            seed: self.common.seed(),
            threads: self.common.threads(),
        })
    }

    /// Applies the `--seed` and `--threads` flags given alongside `--config`.
    fn override_config(&self, experiment: &mut Experiment) {
        if let Some(seed) = self.common.seed {
            experiment.seed = seed;
        }
        if let Some(threads) = self.common.threads {
            experiment.threads = threads;
        }
    }
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let experiment = arg.experiment()?;
    let actuals = experiment
        .estimators
        .iter()
        .map(|&estimator| {
            let actual = arg
                .actual
                .or_else(|| estimator.true_value(&experiment.distribution))
                .with_context(|| {
                    format!(
                        "{estimator} has no true value under {:?}; pass --actual",
                        experiment.distribution
                    )
                })?;
            Ok((estimator, actual))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    info!(
        seed = experiment.seed,
        sample_size = experiment.sample_size,
        iterations = experiment.iterations,
        "running experiment"
    );
    let report = super::experiment_report("experiment", &experiment, &actuals, &arg.common)?;
    arg.common.emit(&report)
}

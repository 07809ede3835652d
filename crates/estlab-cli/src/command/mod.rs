use std::path::PathBuf;

use clap::{Parser, Subcommand};
use estlab_sim::{driver::Experiment, estimator::Estimator};
use rand::Rng as _;
use tracing::info;

use crate::report::{EstimatorReport, OutputFormat, Report};

use self::{exercise::ExerciseArg, run::RunArg};

mod exercise;
mod run;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run an experiment described by flags or a JSON file
    Run(#[clap(flatten)] RunArg),
    /// Run one of the built-in estimator exercises
    Exercise(#[clap(flatten)] ExerciseArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Run(arg) => run::run(&arg)?,
        Mode::Exercise(arg) => exercise::run(&arg)?,
    }
    Ok(())
}

const DEFAULT_THREADS: usize = 1;

/// Flags shared by every command.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct CommonArg {
    /// Seed for the random number generators (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Number of worker threads, 0 uses every available core [default: 1]
    #[arg(long)]
    threads: Option<usize>,
    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Output file path (stdout if omitted or `-`)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Include empirical CDF points of every estimator in JSON reports
    #[arg(long)]
    cdf: bool,
}

impl CommonArg {
    fn seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            let seed = rand::rng().random();
            info!(seed, "no seed given, drew one from the OS generator");
            seed
        })
    }

    fn threads(&self) -> usize {
        self.threads.unwrap_or(DEFAULT_THREADS)
    }

    fn emit(&self, report: &Report) -> anyhow::Result<()> {
        report.emit(self.format, self.output.as_deref())
    }
}

/// Runs `experiment` and reports every estimator against its true value.
fn experiment_report(
    title: &str,
    experiment: &Experiment,
    actuals: &[(Estimator, f64)],
    common: &CommonArg,
) -> anyhow::Result<Report> {
    let table = experiment.run()?;
    let mut report = Report::new(title, experiment)?;
    for &(estimator, actual) in actuals {
        let estimates = table
            .get(estimator)
            .ok_or_else(|| anyhow::anyhow!("Estimator {estimator} was not run"))?;
        report.estimators.push(EstimatorReport::new(
            estimator.name(),
            estimates,
            actual,
            common.cdf,
        )?);
    }
    info!(
        iterations = experiment.iterations,
        estimators = report.estimators.len(),
        "experiment finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_exercise_with_trailing_flags() {
        let args = CommandArgs::try_parse_from([
            "estlab", "exercise", "goals", "--seed", "3", "--format", "json",
        ])
        .unwrap();
        let Mode::Exercise(arg) = args.mode else {
            panic!("expected exercise mode");
        };
        assert_eq!(arg.common.seed, Some(3));
        assert_eq!(arg.common.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_run_estimator_list() {
        let args = CommandArgs::try_parse_from([
            "estlab",
            "run",
            "--estimator",
            "rate-from-mean,rate-from-median",
            "--distribution",
            "exponential",
        ])
        .unwrap();
        let Mode::Run(arg) = args.mode else {
            panic!("expected run mode");
        };
        assert_eq!(
            arg.estimators,
            [Estimator::RateFromMean, Estimator::RateFromMedian]
        );
    }

    #[test]
    fn test_unknown_estimator_is_rejected() {
        let result = CommandArgs::try_parse_from(["estlab", "run", "--estimator", "mode"]);
        assert!(result.is_err());
    }
}

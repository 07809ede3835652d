//! Large-sample checks of estimator bias and error.
//!
//! Seeds are fixed, so each check is deterministic; the tolerances leave several
//! standard errors of room around the theoretical values.

use estlab_sim::{
    distribution::Distribution,
    driver::{Experiment, GameExperiment},
    estimator::Estimator,
};
use estlab_stats::{
    error_metrics::{ErrorSummary, mean_error, rmse},
    percentiles::percentile,
    sampling::SamplingDistribution,
};

const ITERATIONS: usize = 100_000;
const SAMPLE_SIZE: usize = 7;

fn run(distribution: Distribution, estimators: &[Estimator], seed: u64) -> Experiment {
    Experiment {
        distribution,
        sample_size: SAMPLE_SIZE,
        iterations: ITERATIONS,
        estimators: estimators.to_vec(),
        seed,
        threads: 0,
    }
}

#[test]
fn unbiased_variance_converges_and_biased_variance_does_not() {
    let table = run(
        Distribution::gaussian(0.0, 1.0).unwrap(),
        &[Estimator::BiasedVariance, Estimator::UnbiasedVariance],
        2024,
    )
    .run()
    .unwrap();

    let unbiased = mean_error(table.get(Estimator::UnbiasedVariance).unwrap(), 1.0).unwrap();
    let biased = mean_error(table.get(Estimator::BiasedVariance).unwrap(), 1.0).unwrap();

    assert!(unbiased.abs() < 0.01, "unbiased mean error = {unbiased}");
    #[expect(clippy::cast_precision_loss)]
    let expected_bias = -1.0 / SAMPLE_SIZE as f64;
    assert!(
        (biased - expected_bias).abs() < 0.01,
        "biased mean error = {biased}"
    );
}

#[test]
fn mean_beats_median_for_gaussian_location() {
    let table = run(
        Distribution::gaussian(0.0, 1.0).unwrap(),
        &[Estimator::Mean, Estimator::Median],
        7,
    )
    .run()
    .unwrap();

    let mean_rmse = rmse(table.get(Estimator::Mean).unwrap(), 0.0).unwrap();
    let median_rmse = rmse(table.get(Estimator::Median).unwrap(), 0.0).unwrap();
    assert!(mean_rmse < median_rmse, "{mean_rmse} >= {median_rmse}");
    // Both are unbiased for a symmetric population.
    for estimator in [Estimator::Mean, Estimator::Median] {
        let bias = mean_error(table.get(estimator).unwrap(), 0.0).unwrap();
        assert!(bias.abs() < 0.01, "{estimator}: {bias}");
    }
}

#[test]
fn exponential_rate_estimators_are_biased_upward() {
    let lambda = 2.0;
    let table = run(
        Distribution::exponential(lambda).unwrap(),
        &[Estimator::RateFromMean, Estimator::RateFromMedian],
        99,
    )
    .run()
    .unwrap();

    let from_mean =
        ErrorSummary::new(table.get(Estimator::RateFromMean).unwrap(), lambda).unwrap();
    let from_median =
        ErrorSummary::new(table.get(Estimator::RateFromMedian).unwrap(), lambda).unwrap();

    assert!(from_mean.rmse < from_median.rmse);
    assert!(from_mean.mean_error > 0.1, "{from_mean:?}");
    assert!(from_median.mean_error > 0.1, "{from_median:?}");
    // E[1 / mean] = lambda * n / (n - 1) for exponential samples.
    #[expect(clippy::cast_precision_loss)]
    let expected = lambda / (SAMPLE_SIZE as f64 - 1.0);
    assert!((from_mean.mean_error - expected).abs() < 0.03);
}

#[test]
fn goal_counts_estimate_lambda_without_bias() {
    let lambda = 2.0_f64;
    let counts = GameExperiment {
        lambda,
        iterations: 1_000_000,
        seed: 5,
        threads: 0,
    }
    .run()
    .unwrap();

    let summary = ErrorSummary::new(&counts, lambda).unwrap();
    assert!(summary.mean_error.abs() < 0.01, "{summary:?}");
    assert!((summary.rmse - lambda.sqrt()).abs() < 0.01, "{summary:?}");
}

#[test]
fn sampling_distribution_percentiles_match_order_statistics() {
    let table = Experiment {
        distribution: Distribution::gaussian(90.0, 7.5).unwrap(),
        sample_size: 9,
        iterations: 1000,
        estimators: vec![Estimator::Mean],
        seed: 17,
        threads: 1,
    }
    .run()
    .unwrap();

    let means = table.get(Estimator::Mean).unwrap();
    let dist = SamplingDistribution::new(means.iter().copied()).unwrap();
    let min = means.iter().copied().fold(f64::INFINITY, f64::min);
    let max = means.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    assert_eq!(percentile(means, 0.0).unwrap(), min);
    assert_eq!(percentile(means, 100.0).unwrap(), max);
    assert_eq!(
        percentile(means, 50.0).unwrap(),
        Estimator::Median.apply(means).unwrap()
    );

    let summary = dist.summarize(90.0).unwrap();
    // sigma / sqrt(n) = 2.5
    assert!((summary.standard_error - 2.5).abs() < 0.25, "{summary:?}");
    assert!(summary.confidence_interval.contains(90.0));
}

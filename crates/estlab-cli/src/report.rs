use std::{io::Write, path::Path};

use anyhow::Context as _;
use estlab_sim::driver::SweepPoint;
use estlab_stats::{
    descriptive::DescriptiveStats,
    percentiles::Percentiles,
    sampling::{ConfidenceInterval, SamplingDistribution},
};
use serde::Serialize;

use crate::util::Output;

const PERCENTILE_POINTS: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Result of one experiment, ready to print or serialize.
#[derive(Debug, Serialize)]
pub struct Report {
    pub title: String,
    pub setup: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub estimators: Vec<EstimatorReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sweep: Vec<SweepPoint>,
}

/// Error metrics and sampling distribution of one estimator.
#[derive(Debug, Serialize)]
pub struct EstimatorReport {
    pub name: String,
    pub actual: f64,
    pub mean_error: f64,
    pub standard_error: f64,
    pub confidence_interval: ConfidenceInterval,
    pub estimates: DescriptiveStats,
    pub percentiles: Percentiles,
    /// Empirical CDF `(value, probability)` points, for plotting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdf: Option<Vec<(f64, f64)>>,
}

impl EstimatorReport {
    pub fn new(
        name: impl Into<String>,
        estimates: &[f64],
        actual: f64,
        with_cdf: bool,
    ) -> anyhow::Result<Self> {
        let name = name.into();
        let dist = SamplingDistribution::new(estimates.iter().copied())
            .with_context(|| format!("No estimates collected for {name}"))?;
        let summary = dist.summarize(actual)?;
        Ok(Self {
            actual,
            mean_error: summary.mean_error,
            standard_error: summary.standard_error,
            confidence_interval: summary.confidence_interval,
            estimates: dist.descriptive(),
            percentiles: dist.percentiles(&PERCENTILE_POINTS)?,
            cdf: with_cdf.then(|| dist.cdf_points().collect()),
            name,
        })
    }
}

impl Report {
    pub fn new<S>(title: impl Into<String>, setup: &S) -> anyhow::Result<Self>
    where
        S: Serialize,
    {
        Ok(Self {
            title: title.into(),
            setup: serde_json::to_value(setup).context("Failed to serialize experiment setup")?,
            estimators: vec![],
            sweep: vec![],
        })
    }

    pub fn emit(&self, format: OutputFormat, output_path: Option<&Path>) -> anyhow::Result<()> {
        let mut output = Output::from_output_path(output_path)?;
        match format {
            OutputFormat::Json => output.write_json(self),
            OutputFormat::Text => {
                self.write_text(&mut output).with_context(|| {
                    format!("Failed to write report to {}", output.display_path())
                })?;
                output.finish()
            }
        }
    }

    fn write_text<W>(&self, w: &mut W) -> std::io::Result<()>
    where
        W: Write,
    {
        writeln!(w, "== {} ==", self.title)?;
        if let Some(setup) = self.setup.as_object() {
            for (key, value) in setup {
                writeln!(w, "  {key}: {value}")?;
            }
        }

        if !self.estimators.is_empty() {
            writeln!(w)?;
            writeln!(
                w,
                "  {:<18} {:>10} {:>11} {:>10}   90% CI",
                "estimator", "actual", "mean error", "rmse"
            )?;
            for est in &self.estimators {
                let ci = &est.confidence_interval;
                writeln!(
                    w,
                    "  {:<18} {:>10.4} {:>11.4} {:>10.4}   [{:.4}, {:.4}]",
                    est.name, est.actual, est.mean_error, est.standard_error, ci.lower, ci.upper
                )?;
            }
        }

        if !self.sweep.is_empty() {
            writeln!(w)?;
            writeln!(w, "  {:>6} {:>11} {:>10}", "n", "mean error", "rmse")?;
            for point in &self.sweep {
                writeln!(
                    w,
                    "  {:>6} {:>11.4} {:>10.4}",
                    point.sample_size, point.mean_error, point.rmse
                )?;
            }
        }
        Ok(())
    }
}

//! Pipeline runner: variance filter, two-group test and ranking.

use super::config::AnalysisConfig;
use crate::data::{ExpressionTable, FeatureGranularity, TestResultSet};
use crate::error::{Result, SigdiffError};
use crate::filter::{filter_variance_with_stats, VarianceFilterResult, DEFAULT_VARIANCE_THRESHOLD};
use crate::load::{load_experiment, Experiment};
use crate::report::{rank, RankedReport, DEFAULT_SIGNIFICANCE_THRESHOLD};
use crate::test::{test_differential, TestOptions};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Builder for configuring and running an analysis.
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    variance_threshold: f64,
    significance_threshold: f64,
    granularity: FeatureGranularity,
    options: TestOptions,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a pipeline with default thresholds at transcript level.
    pub fn new() -> Self {
        Self {
            name: "unnamed".to_string(),
            variance_threshold: DEFAULT_VARIANCE_THRESHOLD,
            significance_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
            granularity: FeatureGranularity::Transcript,
            options: TestOptions::default(),
        }
    }

    /// Create from a config.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            name: config.name.clone(),
            variance_threshold: config.variance_threshold,
            significance_threshold: config.significance_threshold,
            granularity: config.granularity,
            options: TestOptions {
                log_transform: config.log_transform,
            },
        }
    }

    /// Set the pipeline name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Keep only features with variance strictly above `threshold`.
    pub fn variance_threshold(mut self, threshold: f64) -> Self {
        self.variance_threshold = threshold;
        self
    }

    /// Report features with p-value strictly below `threshold`.
    pub fn significance_threshold(mut self, threshold: f64) -> Self {
        self.significance_threshold = threshold;
        self
    }

    /// Analyse transcripts or genes.
    pub fn granularity(mut self, granularity: FeatureGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Test on the log2(x + 1) scale.
    pub fn log_transform(mut self, enabled: bool) -> Self {
        self.options.log_transform = enabled;
        self
    }

    /// Run filter, test and ranking on an experiment.
    ///
    /// The experiment is not modified. Stage failures are reported as
    /// [`SigdiffError::Pipeline`] naming the stage.
    pub fn run(&self, experiment: &Experiment) -> Result<PipelineOutput> {
        let table = experiment.table(self.granularity);
        log::info!(
            "Pipeline '{}': {} {} features across {} samples ({})",
            self.name,
            table.n_features(),
            self.granularity,
            table.n_samples(),
            table.measurement()
        );

        let (filtered, filter_stats) =
            filter_variance_with_stats(table, self.variance_threshold)
                .map_err(|e| stage_failed("variance filter", e))?;
        log::info!(
            "Variance filter kept {} of {} features (variance > {})",
            filter_stats.n_after,
            filter_stats.n_before,
            self.variance_threshold
        );

        let results = test_differential(&filtered, &experiment.registry, self.options)
            .map_err(|e| stage_failed("differential test", e))?;

        let report = rank(&results, &experiment.annotation, self.significance_threshold)
            .map_err(|e| stage_failed("ranking", e))?;

        Ok(PipelineOutput {
            filtered,
            filter_stats,
            results,
            report,
        })
    }
}

fn stage_failed(stage: &str, err: SigdiffError) -> SigdiffError {
    SigdiffError::Pipeline(format!("{} failed: {}", stage, err))
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Table after the variance filter.
    pub filtered: ExpressionTable,
    pub filter_stats: VarianceFilterResult,
    /// One result per filtered feature.
    pub results: TestResultSet,
    /// Significant features, ranked.
    pub report: RankedReport,
}

impl PipelineOutput {
    pub fn summary(&self) -> PipelineSummary {
        PipelineSummary {
            granularity: self.results.granularity,
            reference: self.results.reference.clone(),
            comparison: self.results.comparison.clone(),
            n_loaded: self.filter_stats.n_before,
            n_kept: self.filter_stats.n_after,
            n_tested: self.results.len() - self.results.n_untestable(),
            n_untestable: self.results.n_untestable(),
            n_significant: self.report.len(),
            significance_threshold: self.report.threshold,
        }
    }
}

/// Feature counts at each stage of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub granularity: FeatureGranularity,
    pub reference: String,
    pub comparison: String,
    pub n_loaded: usize,
    pub n_kept: usize,
    pub n_tested: usize,
    pub n_untestable: usize,
    pub n_significant: usize,
    pub significance_threshold: f64,
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Differential expression: {} vs {} ({} level)",
            self.comparison, self.reference, self.granularity
        )?;
        writeln!(f, "  Features loaded:      {}", self.n_loaded)?;
        writeln!(f, "  Kept by filter:       {}", self.n_kept)?;
        writeln!(f, "  Tested:               {}", self.n_tested)?;
        writeln!(f, "  Untestable:           {}", self.n_untestable)?;
        writeln!(
            f,
            "  Significant (p < {}): {}",
            self.significance_threshold, self.n_significant
        )?;
        Ok(())
    }
}

/// Load the experiment a config describes.
pub fn load_config_experiment(config: &AnalysisConfig) -> Result<Experiment> {
    config.validate()?;
    let registry = config.registry()?;
    let paths = config.sample_paths(&registry)?;
    load_experiment(registry, &paths, config.measurement)
}

/// Load, run and write the report to `config.output`.
pub fn run_config(config: &AnalysisConfig) -> Result<PipelineOutput> {
    let experiment = load_config_experiment(config)?;
    let output = Pipeline::from_config(config).run(&experiment)?;
    output.report.write_tsv(&config.output)?;
    log::info!(
        "Wrote {} ranked features to {}",
        output.report.len(),
        config.output.display()
    );
    Ok(output)
}

//! Two-condition differential expression of transcript quantifications.
//!
//! This library loads per-sample transcript tables, removes low-variance
//! features, tests each remaining feature for a difference between two
//! conditions and writes a ranked table of the significant ones.
//!
//! # Overview
//!
//! - **data**: Core data structures (SampleRegistry, ExpressionTable, annotation, results)
//! - **load**: Reading per-sample `t_data.ctab` tables into an Experiment
//! - **filter**: Variance filtering
//! - **test**: Two-group test (pooled t-test, fold-change)
//! - **correct**: Multiple testing correction (Benjamini-Hochberg)
//! - **report**: Ranking, annotation and export
//! - **plot**: Data shaping for diagnostic plots
//! - **pipeline**: Configuration and execution
//!
//! # Example
//!
//! ```no_run
//! use sigdiff::prelude::*;
//!
//! let config = AnalysisConfig::from_file("analysis.yaml").unwrap();
//! let experiment = load_config_experiment(&config).unwrap();
//!
//! let output = Pipeline::new()
//!     .variance_threshold(1.0)
//!     .significance_threshold(0.05)
//!     .granularity(FeatureGranularity::Transcript)
//!     .run(&experiment)
//!     .unwrap();
//!
//! output.report.write_tsv("SigDiff.txt").unwrap();
//! println!("{}", output.summary());
//! ```

pub mod correct;
pub mod data;
pub mod error;
pub mod filter;
pub mod load;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::correct::{correct, n_significant};
    pub use crate::data::{
        Condition, ExpressionTable, FeatureAnnotation, FeatureGranularity, MeasurementKind,
        ResultSummary, Sample, SampleRegistry, TestResult, TestResultSet, TranscriptInfo,
        Untestable,
    };
    pub use crate::error::{Result, SigdiffError};
    pub use crate::filter::{filter_variance, filter_variance_with_stats, VarianceFilterResult};
    pub use crate::load::{load_experiment, sample_path, Experiment};
    pub use crate::pipeline::{
        load_config_experiment, run_config, AnalysisConfig, Pipeline, PipelineOutput,
        PipelineSummary, SampleEntry,
    };
    pub use crate::plot::{
        condition_means, feature_boxplot, features_per_parent, histogram, log2_fold_changes,
        replicate_concordance, BoxplotData, Histogram, ScatterData,
    };
    pub use crate::report::{rank, RankedReport, RankedRow};
    pub use crate::test::{test_differential, TestOptions};
}

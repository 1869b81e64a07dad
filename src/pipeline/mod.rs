//! Configuration and execution of a differential expression run.

mod config;
mod runner;

pub use config::{AnalysisConfig, SampleEntry};
pub use runner::{
    load_config_experiment, run_config, Pipeline, PipelineOutput, PipelineSummary,
};

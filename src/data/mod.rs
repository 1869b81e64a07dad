//! Data structures for differential expression analysis.

mod annotation;
mod expression;
mod result;
mod sample;

pub use annotation::{FeatureAnnotation, TranscriptInfo};
pub use expression::{ExpressionTable, FeatureGranularity, MeasurementKind};
pub(crate) use expression::{mean, sum_sq_dev};
pub use result::{ResultSummary, TestResult, TestResultSet, Untestable};
pub use sample::{Condition, Sample, SampleRegistry};

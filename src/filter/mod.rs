//! Filtering primitives for expression tables.

pub mod variance;

pub use variance::{
    filter_variance, filter_variance_with_stats, VarianceFilterResult, DEFAULT_VARIANCE_THRESHOLD,
};

//! Ranked report of significant features.

pub mod rank;

pub use rank::{
    compare_rows, rank, RankedReport, RankedRow, DEFAULT_REPORT_FILE,
    DEFAULT_SIGNIFICANCE_THRESHOLD, REPORT_HEADER,
};

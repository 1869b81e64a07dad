//! Variance-based filtering for expression tables.

use crate::data::ExpressionTable;
use crate::error::{Result, SigdiffError};
use serde::{Deserialize, Serialize};

/// Default variance threshold.
pub const DEFAULT_VARIANCE_THRESHOLD: f64 = 1.0;

/// Keep features whose across-sample variance exceeds a threshold.
///
/// Variance is the sample variance (n - 1 denominator) over all columns and
/// the comparison is strict: a row with variance exactly equal to the
/// threshold is dropped. An empty result is valid.
///
/// # Arguments
/// * `table` - The table to filter; left untouched
/// * `threshold` - Non-negative variance threshold
///
/// # Returns
/// A new table with the kept rows, in their original order.
pub fn filter_variance(table: &ExpressionTable, threshold: f64) -> Result<ExpressionTable> {
    filter_variance_with_stats(table, threshold).map(|(filtered, _)| filtered)
}

/// Result of variance filtering with statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceFilterResult {
    /// Threshold that was applied.
    pub threshold: f64,
    /// Number of features before filtering.
    pub n_before: usize,
    /// Number of features after filtering.
    pub n_after: usize,
    /// Number of features removed.
    pub n_removed: usize,
    /// Proportion of features retained.
    pub retention_rate: f64,
}

impl std::fmt::Display for VarianceFilterResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Variance Filter Result (variance > {})", self.threshold)?;
        writeln!(f, "  Features before:  {}", self.n_before)?;
        writeln!(f, "  Features after:   {}", self.n_after)?;
        writeln!(f, "  Features removed: {}", self.n_removed)?;
        writeln!(f, "  Retention:        {:.1}%", self.retention_rate * 100.0)?;
        Ok(())
    }
}

/// Filter with statistics about what was filtered.
pub fn filter_variance_with_stats(
    table: &ExpressionTable,
    threshold: f64,
) -> Result<(ExpressionTable, VarianceFilterResult)> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(SigdiffError::InvalidParameter(format!(
            "variance threshold must be a non-negative number, got {}",
            threshold
        )));
    }

    let keep: Vec<usize> = table
        .row_variances()
        .iter()
        .enumerate()
        .filter(|(_, &v)| v > threshold)
        .map(|(i, _)| i)
        .collect();

    let filtered = table.subset_features(&keep)?;
    let n_before = table.n_features();
    let n_after = filtered.n_features();

    let stats = VarianceFilterResult {
        threshold,
        n_before,
        n_after,
        n_removed: n_before - n_after,
        retention_rate: if n_before > 0 {
            n_after as f64 / n_before as f64
        } else {
            0.0
        },
    };

    Ok((filtered, stats))
}

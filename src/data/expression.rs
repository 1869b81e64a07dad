//! Dense expression table: features × samples measurements.

use crate::error::{Result, SigdiffError};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Measurement reported by the upstream quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    /// Fragments per kilobase of transcript per million mapped reads.
    #[default]
    Fpkm,
    /// Average per-base read coverage.
    Cov,
}

impl MeasurementKind {
    /// Column header holding this measurement in a transcript table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Fpkm => "FPKM",
            Self::Cov => "cov",
        }
    }
}

impl std::fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Feature granularity a table or test refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeatureGranularity {
    #[default]
    Transcript,
    Gene,
}

impl std::fmt::Display for FeatureGranularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transcript => f.write_str("transcript"),
            Self::Gene => f.write_str("gene"),
        }
    }
}

/// A dense table of non-negative measurements.
///
/// Rows are features (transcripts or genes), columns are samples. Tables are
/// never mutated after construction; filtering produces a new table that
/// keeps the column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTable {
    /// Measurements (features × samples).
    data: DMatrix<f64>,
    /// Feature identifiers (row names).
    feature_ids: Vec<String>,
    /// Sample identifiers (column names).
    sample_ids: Vec<String>,
    measurement: MeasurementKind,
    granularity: FeatureGranularity,
}

impl ExpressionTable {
    /// Create a table, checking dimensions and that every value is finite
    /// and non-negative.
    pub fn new(
        data: DMatrix<f64>,
        feature_ids: Vec<String>,
        sample_ids: Vec<String>,
        measurement: MeasurementKind,
        granularity: FeatureGranularity,
    ) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != feature_ids.len() {
            return Err(SigdiffError::DimensionMismatch {
                expected: nrows,
                actual: feature_ids.len(),
            });
        }
        if ncols != sample_ids.len() {
            return Err(SigdiffError::DimensionMismatch {
                expected: ncols,
                actual: sample_ids.len(),
            });
        }
        for row in 0..nrows {
            for col in 0..ncols {
                let v = data[(row, col)];
                if !v.is_finite() || v < 0.0 {
                    return Err(SigdiffError::InvalidValue {
                        value: v.to_string(),
                        row,
                        column: sample_ids[col].clone(),
                    });
                }
            }
        }
        Ok(Self {
            data,
            feature_ids,
            sample_ids,
            measurement,
            granularity,
        })
    }

    /// Build a table from row vectors, one per feature.
    pub fn from_rows(
        rows: &[Vec<f64>],
        feature_ids: Vec<String>,
        sample_ids: Vec<String>,
        measurement: MeasurementKind,
        granularity: FeatureGranularity,
    ) -> Result<Self> {
        let ncols = sample_ids.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
            return Err(SigdiffError::DimensionMismatch {
                expected: ncols,
                actual: bad.len(),
            });
        }
        let data = DMatrix::from_fn(rows.len(), ncols, |r, c| rows[r][c]);
        Self::new(data, feature_ids, sample_ids, measurement, granularity)
    }

    /// Value at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[(row, col)]
    }

    /// Number of features (rows).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples (columns).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Whether the table has no features.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_features() == 0
    }

    #[inline]
    pub fn feature_ids(&self) -> &[String] {
        &self.feature_ids
    }

    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    #[inline]
    pub fn measurement(&self) -> MeasurementKind {
        self.measurement
    }

    #[inline]
    pub fn granularity(&self) -> FeatureGranularity {
        self.granularity
    }

    /// Underlying matrix.
    #[inline]
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Row index of a feature.
    pub fn feature_index(&self, feature_id: &str) -> Option<usize> {
        self.feature_ids.iter().position(|f| f == feature_id)
    }

    /// Column index of a sample.
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|s| s == sample_id)
    }

    /// Dense copy of one row (feature).
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.data.row(row).iter().copied().collect()
    }

    /// Dense copy of one column (sample).
    pub fn column(&self, col: usize) -> Vec<f64> {
        self.data.column(col).iter().copied().collect()
    }

    /// Sample variance (n - 1 denominator) of every row.
    ///
    /// Rows over fewer than two samples have variance 0.
    pub fn row_variances(&self) -> Vec<f64> {
        (0..self.n_features())
            .map(|row| sample_variance(&self.row(row)))
            .collect()
    }

    /// New table holding only the given rows, in the given order.
    pub fn subset_features(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_features()) {
            return Err(SigdiffError::InvalidParameter(format!(
                "Feature index {} out of bounds",
                bad
            )));
        }
        let data = self.data.select_rows(indices);
        let feature_ids = indices
            .iter()
            .map(|&i| self.feature_ids[i].clone())
            .collect();
        Ok(Self {
            data,
            feature_ids,
            sample_ids: self.sample_ids.clone(),
            measurement: self.measurement,
            granularity: self.granularity,
        })
    }

    /// Write the table as TSV (feature id column, then one column per sample).
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);

        write!(writer, "feature_id")?;
        for sample_id in &self.sample_ids {
            write!(writer, "\t{}", sample_id)?;
        }
        writeln!(writer)?;

        for (row, feature_id) in self.feature_ids.iter().enumerate() {
            write!(writer, "{}", feature_id)?;
            for col in 0..self.n_samples() {
                write!(writer, "\t{}", self.get(row, col))?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Mean of a slice; 0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sum of squared deviations from the mean.
pub(crate) fn sum_sq_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum()
}

/// Sample variance with an n - 1 denominator; 0 below two values.
pub(crate) fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    sum_sq_dev(values) / (values.len() - 1) as f64
}

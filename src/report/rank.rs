//! Annotate, threshold and rank test results; export the ranked table.

use crate::data::{FeatureAnnotation, FeatureGranularity, TestResult, TestResultSet};
use crate::error::{Result, SigdiffError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default significance threshold on the raw p-value.
pub const DEFAULT_SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Default file name of the exported report.
pub const DEFAULT_REPORT_FILE: &str = "SigDiff.txt";

/// Header of the exported table, in column order.
pub const REPORT_HEADER: [&str; 6] = ["geneNames", "transcriptNames", "id", "fc", "pval", "qval"];

/// One significant, annotated feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub gene_name: String,
    /// Transcript name; for gene rows, the gene's transcript names joined by `,`.
    pub transcript_name: String,
    pub feature_id: String,
    pub fold_change: f64,
    pub p_value: f64,
    pub q_value: f64,
}

/// Significant features ordered by p-value, then by |fold-change|.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedReport {
    pub granularity: FeatureGranularity,
    pub reference: String,
    pub comparison: String,
    pub threshold: f64,
    pub rows: Vec<RankedRow>,
    /// Results dropped because they had no annotation.
    pub n_unannotated: usize,
}

/// Join results to names, keep `p < threshold` and rank.
///
/// Rows without an annotation are dropped with a warning. Untestable rows
/// never pass the threshold. Sorting is stable: rows equal in p-value and
/// |fold-change| keep their input order.
pub fn rank(
    results: &TestResultSet,
    annotation: &FeatureAnnotation,
    threshold: f64,
) -> Result<RankedReport> {
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(SigdiffError::InvalidParameter(format!(
            "significance threshold must be in (0, 1], got {}",
            threshold
        )));
    }

    let mut n_unannotated = 0;
    let mut rows: Vec<RankedRow> = Vec::new();
    for r in results.iter() {
        let Some((gene_name, transcript_name)) = names_for(r, results.granularity, annotation)
        else {
            log::warn!(
                "No annotation for {} '{}'; dropped from report",
                results.granularity,
                r.feature_id
            );
            n_unannotated += 1;
            continue;
        };
        if !r.is_significant_at(threshold) {
            continue;
        }
        rows.push(RankedRow {
            gene_name,
            transcript_name,
            feature_id: r.feature_id.clone(),
            fold_change: r.fold_change,
            p_value: r.p_value,
            q_value: r.q_value,
        });
    }

    rows.sort_by(compare_rows);

    log::info!(
        "{} of {} {} features significant at p < {}",
        rows.len(),
        results.len(),
        results.granularity,
        threshold
    );

    Ok(RankedReport {
        granularity: results.granularity,
        reference: results.reference.clone(),
        comparison: results.comparison.clone(),
        threshold,
        rows,
        n_unannotated,
    })
}

/// Report order: ascending p-value, then descending |fold-change|.
pub fn compare_rows(a: &RankedRow, b: &RankedRow) -> Ordering {
    a.p_value
        .total_cmp(&b.p_value)
        .then_with(|| b.fold_change.abs().total_cmp(&a.fold_change.abs()))
}

fn names_for(
    r: &TestResult,
    granularity: FeatureGranularity,
    annotation: &FeatureAnnotation,
) -> Option<(String, String)> {
    match granularity {
        FeatureGranularity::Transcript => {
            let t = annotation.transcript(&r.feature_id)?;
            let gene = annotation.gene_name(&t.gene_id)?;
            Some((gene.to_string(), t.transcript_name.clone()))
        }
        FeatureGranularity::Gene => {
            let gene = annotation.gene_name(&r.feature_id)?;
            let names: Vec<&str> = annotation
                .transcripts_of(&r.feature_id)
                .iter()
                .map(|t| t.transcript_name.as_str())
                .collect();
            Some((gene.to_string(), names.join(",")))
        }
    }
}

impl RankedReport {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedRow> {
        self.rows.iter()
    }

    /// Whether adjacent rows respect the report order.
    pub fn is_sorted(&self) -> bool {
        self.rows
            .windows(2)
            .all(|w| compare_rows(&w[0], &w[1]) != Ordering::Greater)
    }

    /// Write the report as a tab-delimited table.
    ///
    /// Literal header row, fixed column order, no index column, no quoting.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .has_headers(false)
            .from_writer(writer);

        wtr.write_record(REPORT_HEADER)?;
        for row in &self.rows {
            let fc = format_value(row.fold_change);
            let pval = format_value(row.p_value);
            let qval = format_value(row.q_value);
            wtr.write_record([
                row.gene_name.as_str(),
                row.transcript_name.as_str(),
                row.feature_id.as_str(),
                fc.as_str(),
                pval.as_str(),
                qval.as_str(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the report to a file.
    pub fn write_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.to_writer(BufWriter::new(file))
    }

    /// The exported table as a string.
    pub fn to_tsv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        String::from_utf8(buf).map_err(|e| SigdiffError::Pipeline(e.to_string()))
    }
}

/// Shortest round-trip text for a value; scientific notation below 1e-4.
fn format_value(v: f64) -> String {
    if v != 0.0 && v.is_finite() && v.abs() < 1e-4 {
        format!("{:e}", v)
    } else {
        v.to_string()
    }
}

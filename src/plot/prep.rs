//! Data shaping for diagnostic plots.
//!
//! Every function here is pure and deterministic. Rendering belongs to an
//! external sink that takes x/y sequences with labels; the structs are
//! `Serialize` so they can be handed over as JSON.

use crate::data::{
    mean, Condition, ExpressionTable, FeatureAnnotation, SampleRegistry, TestResultSet,
};
use crate::error::{Result, SigdiffError};
use serde::{Deserialize, Serialize};

/// Paired values for a scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterData {
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Point labels (feature ids), parallel to `x` and `y`.
    pub labels: Vec<String>,
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin edges; `edges.len() == counts.len() + 1`.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Five-number summary of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxGroup {
    pub label: String,
    pub values: Vec<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Per-condition distribution of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxplotData {
    pub feature_id: String,
    pub log_scale: bool,
    pub groups: Vec<BoxGroup>,
}

/// log2(x + 1) of every value.
pub fn log2_plus_one(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| (v + 1.0).log2()).collect()
}

/// Two sample columns on the log2(x + 1) scale, for replicate concordance.
pub fn replicate_concordance(
    table: &ExpressionTable,
    x_sample: &str,
    y_sample: &str,
) -> Result<ScatterData> {
    let col = |id: &str| {
        table.sample_index(id).ok_or_else(|| {
            SigdiffError::SampleMismatch(format!("sample '{}' not in table", id))
        })
    };
    let (cx, cy) = (col(x_sample)?, col(y_sample)?);

    Ok(ScatterData {
        x_label: format!("log2({} + 1), {}", table.measurement(), x_sample),
        y_label: format!("log2({} + 1), {}", table.measurement(), y_sample),
        x: log2_plus_one(&table.column(cx)),
        y: log2_plus_one(&table.column(cy)),
        labels: table.feature_ids().to_vec(),
    })
}

/// Per-feature mean of each condition on the log2(x + 1) scale.
///
/// x is condition A, y is condition B.
pub fn condition_means(table: &ExpressionTable, registry: &SampleRegistry) -> Result<ScatterData> {
    registry.check_columns(table.sample_ids())?;
    let idx_a = registry.indices(Condition::A);
    let idx_b = registry.indices(Condition::B);

    let (mut x, mut y) = (Vec::new(), Vec::new());
    for row in 0..table.n_features() {
        let values = log2_plus_one(&table.row(row));
        let a: Vec<f64> = idx_a.iter().map(|&i| values[i]).collect();
        let b: Vec<f64> = idx_b.iter().map(|&i| values[i]).collect();
        x.push(mean(&a));
        y.push(mean(&b));
    }

    Ok(ScatterData {
        x_label: format!("mean log2({} + 1), {}", table.measurement(), registry.label(Condition::A)),
        y_label: format!("mean log2({} + 1), {}", table.measurement(), registry.label(Condition::B)),
        x,
        y,
        labels: table.feature_ids().to_vec(),
    })
}

/// Number of transcripts of each gene, in gene order.
pub fn features_per_parent(annotation: &FeatureAnnotation) -> Vec<usize> {
    annotation
        .gene_ids()
        .iter()
        .map(|g| annotation.transcripts_of(g).len())
        .collect()
}

/// log2 of every finite, positive fold-change.
///
/// Infinite, zero and untestable fold-changes have no place on this axis
/// and are skipped.
pub fn log2_fold_changes(results: &TestResultSet) -> Vec<f64> {
    results
        .iter()
        .map(|r| r.fold_change)
        .filter(|fc| fc.is_finite() && *fc > 0.0)
        .map(f64::log2)
        .collect()
}

/// Equal-width histogram over the finite range of `values`.
///
/// Non-finite values are ignored. The last bin includes its upper edge. A
/// constant input yields one bin of width 1 centred on the value.
pub fn histogram(values: &[f64], n_bins: usize) -> Result<Histogram> {
    if n_bins == 0 {
        return Err(SigdiffError::InvalidParameter(
            "histogram needs at least one bin".to_string(),
        ));
    }
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Ok(Histogram {
            edges: Vec::new(),
            counts: Vec::new(),
        });
    }

    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        return Ok(Histogram {
            edges: vec![lo - 0.5, hi + 0.5],
            counts: vec![finite.len()],
        });
    }

    let width = (hi - lo) / n_bins as f64;
    let edges: Vec<f64> = (0..=n_bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; n_bins];
    for v in finite {
        let bin = (((v - lo) / width) as usize).min(n_bins - 1);
        counts[bin] += 1;
    }
    Ok(Histogram { edges, counts })
}

/// Values of one feature split by condition, with quartiles.
pub fn feature_boxplot(
    table: &ExpressionTable,
    registry: &SampleRegistry,
    feature_id: &str,
    log_scale: bool,
) -> Result<BoxplotData> {
    registry.check_columns(table.sample_ids())?;
    let row = table.feature_index(feature_id).ok_or_else(|| {
        SigdiffError::InvalidParameter(format!("feature '{}' not in table", feature_id))
    })?;
    let raw = table.row(row);
    let values = if log_scale { log2_plus_one(&raw) } else { raw };

    let groups = [Condition::A, Condition::B]
        .iter()
        .map(|&c| {
            let v: Vec<f64> = registry.indices(c).iter().map(|&i| values[i]).collect();
            box_group(registry.label(c), v)
        })
        .collect();

    Ok(BoxplotData {
        feature_id: feature_id.to_string(),
        log_scale,
        groups,
    })
}

fn box_group(label: &str, values: Vec<f64>) -> BoxGroup {
    let mut sorted = values.clone();
    sorted.sort_by(f64::total_cmp);
    BoxGroup {
        label: label.to_string(),
        values,
        min: quantile(&sorted, 0.0),
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: quantile(&sorted, 1.0),
    }
}

/// Linear-interpolation quantile of sorted data; NaN when empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FeatureGranularity, MeasurementKind, TestResult};
    use approx::assert_relative_eq;

    fn registry() -> SampleRegistry {
        SampleRegistry::new(
            vec![("s1", "old"), ("s2", "old"), ("s3", "young"), ("s4", "young")],
            None,
        )
        .unwrap()
    }

    fn table() -> ExpressionTable {
        ExpressionTable::from_rows(
            &[vec![0.0, 1.0, 3.0, 7.0], vec![15.0, 15.0, 1.0, 3.0]],
            vec!["t1".into(), "t2".into()],
            vec!["s1".into(), "s2".into(), "s3".into(), "s4".into()],
            MeasurementKind::Fpkm,
            FeatureGranularity::Transcript,
        )
        .unwrap()
    }

    #[test]
    fn test_replicate_concordance() {
        let scatter = replicate_concordance(&table(), "s1", "s4").unwrap();
        assert_eq!(scatter.x, vec![0.0, 4.0]);
        assert_eq!(scatter.y, vec![3.0, 2.0]);
        assert_eq!(scatter.labels, vec!["t1", "t2"]);
        assert!(replicate_concordance(&table(), "s1", "s9").is_err());
    }

    #[test]
    fn test_condition_means() {
        let scatter = condition_means(&table(), &registry()).unwrap();
        // t1: old log2 values [0, 1], young [2, 3]
        assert_relative_eq!(scatter.x[0], 0.5);
        assert_relative_eq!(scatter.y[0], 2.5);
        assert_relative_eq!(scatter.x[1], 4.0);
        assert_relative_eq!(scatter.y[1], 1.5);
        assert!(scatter.x_label.contains("old"));
    }

    #[test]
    fn test_features_per_parent() {
        let mut ann = FeatureAnnotation::new();
        ann.insert("1", "a", "G1", "X");
        ann.insert("2", "b", "G1", "X");
        ann.insert("3", "c", "G2", "Y");
        assert_eq!(features_per_parent(&ann), vec![2, 1]);
    }

    #[test]
    fn test_log2_fold_changes_skips_unplottable() {
        let mk = |fc: f64| TestResult {
            feature_id: "x".into(),
            mean_a: 1.0,
            mean_b: fc,
            fold_change: fc,
            statistic: 0.0,
            df: 2.0,
            p_value: 0.5,
            q_value: 0.5,
            untestable: None,
        };
        let set = TestResultSet {
            granularity: FeatureGranularity::Transcript,
            reference: "old".into(),
            comparison: "young".into(),
            results: vec![mk(4.0), mk(0.25), mk(f64::INFINITY), mk(0.0), mk(f64::NAN)],
        };
        assert_eq!(log2_fold_changes(&set), vec![2.0, -2.0]);
    }

    #[test]
    fn test_histogram() {
        let h = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0, f64::NAN], 2).unwrap();
        assert_eq!(h.edges, vec![0.0, 2.0, 4.0]);
        assert_eq!(h.counts, vec![2, 3]);
        assert_eq!(h.counts.iter().sum::<usize>(), 5);

        let constant = histogram(&[2.0, 2.0], 10).unwrap();
        assert_eq!(constant.counts, vec![2]);

        let empty = histogram(&[], 5).unwrap();
        assert!(empty.counts.is_empty());

        assert!(histogram(&[1.0], 0).is_err());
    }

    #[test]
    fn test_feature_boxplot() {
        let bp = feature_boxplot(&table(), &registry(), "t2", false).unwrap();
        assert_eq!(bp.groups.len(), 2);
        assert_eq!(bp.groups[0].label, "old");
        assert_eq!(bp.groups[0].values, vec![15.0, 15.0]);
        assert_eq!(bp.groups[1].median, 2.0);
        assert_eq!(bp.groups[1].q1, 1.5);
        assert_eq!(bp.groups[1].max, 3.0);

        let logged = feature_boxplot(&table(), &registry(), "t1", true).unwrap();
        assert_eq!(logged.groups[1].values, vec![2.0, 3.0]);

        assert!(feature_boxplot(&table(), &registry(), "t9", true).is_err());
    }
}

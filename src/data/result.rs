//! Per-feature differential test results.

use crate::data::FeatureGranularity;
use serde::{Deserialize, Serialize};

/// Why a feature could not be tested.
///
/// Untestable rows carry NaN p- and q-values and never reach a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Untestable {
    /// Not enough samples for a residual degree of freedom.
    TooFewSamples,
    /// No spread within either group and no difference between them.
    NoVariance,
    /// A value on the test scale was not finite.
    NonFinite,
}

impl Untestable {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TooFewSamples => "too_few_samples",
            Self::NoVariance => "no_variance",
            Self::NonFinite => "non_finite",
        }
    }
}

/// Test result for a single feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Feature identifier.
    pub feature_id: String,
    /// Mean measurement in the reference condition (A).
    pub mean_a: f64,
    /// Mean measurement in condition B.
    pub mean_b: f64,
    /// Linear fold-change, mean_b / mean_a.
    pub fold_change: f64,
    /// t statistic on the test scale.
    pub statistic: f64,
    /// Residual degrees of freedom.
    pub df: f64,
    /// Two-sided p-value; NaN when untestable.
    pub p_value: f64,
    /// Benjamini-Hochberg adjusted p-value; NaN when untestable.
    pub q_value: f64,
    /// Set when the feature could not be tested.
    pub untestable: Option<Untestable>,
}

impl TestResult {
    pub fn is_testable(&self) -> bool {
        self.untestable.is_none() && self.p_value.is_finite()
    }

    /// Raw p-value below `alpha`. Untestable rows never pass.
    pub fn is_significant_at(&self, alpha: f64) -> bool {
        self.is_testable() && self.p_value < alpha
    }
}

/// All results from one test call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResultSet {
    /// Granularity of the tested features.
    pub granularity: FeatureGranularity,
    /// Label of condition A.
    pub reference: String,
    /// Label of condition B.
    pub comparison: String,
    /// One result per table row, in table order.
    pub results: Vec<TestResult>,
}

impl TestResultSet {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter()
    }

    pub fn p_values(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.p_value).collect()
    }

    pub fn get_feature(&self, feature_id: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.feature_id == feature_id)
    }

    pub fn n_untestable(&self) -> usize {
        self.results.iter().filter(|r| !r.is_testable()).count()
    }

    /// Count results at the usual thresholds.
    pub fn summary(&self) -> ResultSummary {
        let tested: Vec<&TestResult> = self.results.iter().filter(|r| r.is_testable()).collect();
        ResultSummary {
            total: self.len(),
            untestable: self.len() - tested.len(),
            p_below_05: tested.iter().filter(|r| r.p_value < 0.05).count(),
            q_below_05: tested.iter().filter(|r| r.q_value < 0.05).count(),
            q_below_10: tested.iter().filter(|r| r.q_value < 0.10).count(),
        }
    }
}

/// Summary statistics for a result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total: usize,
    pub untestable: usize,
    pub p_below_05: usize,
    pub q_below_05: usize,
    pub q_below_10: usize,
}

impl std::fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Features tested:   {}", self.total)?;
        writeln!(f, "Untestable:        {}", self.untestable)?;
        writeln!(f, "p < 0.05:          {}", self.p_below_05)?;
        writeln!(f, "q < 0.05:          {}", self.q_below_05)?;
        writeln!(f, "q < 0.10:          {}", self.q_below_10)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, p: f64, q: f64, untestable: Option<Untestable>) -> TestResult {
        TestResult {
            feature_id: id.to_string(),
            mean_a: 1.0,
            mean_b: 2.0,
            fold_change: 2.0,
            statistic: 3.0,
            df: 4.0,
            p_value: p,
            q_value: q,
            untestable,
        }
    }

    #[test]
    fn test_untestable_never_significant() {
        let r = result("t1", f64::NAN, f64::NAN, Some(Untestable::NoVariance));
        assert!(!r.is_testable());
        assert!(!r.is_significant_at(1.0));

        let ok = result("t2", 0.01, 0.02, None);
        assert!(ok.is_significant_at(0.05));
        assert!(!ok.is_significant_at(0.01));
    }

    #[test]
    fn test_summary() {
        let set = TestResultSet {
            granularity: FeatureGranularity::Transcript,
            reference: "old".into(),
            comparison: "young".into(),
            results: vec![
                result("t1", 0.001, 0.004, None),
                result("t2", 0.03, 0.06, None),
                result("t3", 0.5, 0.5, None),
                result("t4", f64::NAN, f64::NAN, Some(Untestable::TooFewSamples)),
            ],
        };
        let s = set.summary();
        assert_eq!(s.total, 4);
        assert_eq!(s.untestable, 1);
        assert_eq!(s.p_below_05, 2);
        assert_eq!(s.q_below_05, 1);
        assert_eq!(s.q_below_10, 2);
        assert_eq!(set.n_untestable(), 1);
        assert!(set.get_feature("t3").is_some());
    }
}

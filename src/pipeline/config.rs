//! Analysis configuration loaded from YAML.

use crate::data::{FeatureGranularity, MeasurementKind, SampleRegistry};
use crate::error::{Result, SigdiffError};
use crate::filter::DEFAULT_VARIANCE_THRESHOLD;
use crate::load::sample_path;
use crate::report::{DEFAULT_REPORT_FILE, DEFAULT_SIGNIFICANCE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A sample listed inline in the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleEntry {
    pub id: String,
    pub condition: String,
    /// Explicit path to the sample's transcript table. Defaults to
    /// `<data_dir>/<id>/t_data.ctab`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Full configuration of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Name of the analysis.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Directory holding one sub-directory per sample.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Samples listed inline.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<SampleEntry>,
    /// Tab-delimited sample sheet, used instead of `samples`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_sheet: Option<PathBuf>,
    /// Column of the sample sheet holding the condition label.
    #[serde(default = "default_condition_column")]
    pub condition_column: String,
    /// Label of the reference condition; defaults to the smaller label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_condition: Option<String>,
    #[serde(default)]
    pub measurement: MeasurementKind,
    #[serde(default)]
    pub granularity: FeatureGranularity,
    #[serde(default = "default_variance_threshold")]
    pub variance_threshold: f64,
    #[serde(default = "default_significance_threshold")]
    pub significance_threshold: f64,
    /// Test on the log2(x + 1) scale.
    #[serde(default = "default_log_transform")]
    pub log_transform: bool,
    /// Path of the exported report.
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_condition_column() -> String {
    "condition".to_string()
}

fn default_variance_threshold() -> f64 {
    DEFAULT_VARIANCE_THRESHOLD
}

fn default_significance_threshold() -> f64 {
    DEFAULT_SIGNIFICANCE_THRESHOLD
}

fn default_log_transform() -> bool {
    true
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_FILE)
}

impl AnalysisConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(SigdiffError::from)
    }

    /// Load from a YAML file. Relative input paths are resolved against the
    /// file's directory; the output path is left as written.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_inputs(base);
        }
        Ok(config)
    }

    /// Check thresholds and the sample source.
    pub fn validate(&self) -> Result<()> {
        if !self.variance_threshold.is_finite() || self.variance_threshold < 0.0 {
            return Err(SigdiffError::Configuration(format!(
                "variance_threshold must be a non-negative number, got {}",
                self.variance_threshold
            )));
        }
        if !(self.significance_threshold > 0.0 && self.significance_threshold <= 1.0) {
            return Err(SigdiffError::Configuration(format!(
                "significance_threshold must be in (0, 1], got {}",
                self.significance_threshold
            )));
        }
        match (self.samples.is_empty(), self.sample_sheet.is_some()) {
            (true, false) => Err(SigdiffError::Configuration(
                "either samples or sample_sheet must be given".to_string(),
            )),
            (false, true) => Err(SigdiffError::Configuration(
                "samples and sample_sheet are mutually exclusive".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn resolve_inputs(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(dir) = self.data_dir.as_mut() {
            resolve(dir);
        }
        if let Some(sheet) = self.sample_sheet.as_mut() {
            resolve(sheet);
        }
        for entry in &mut self.samples {
            if let Some(p) = entry.path.as_mut() {
                resolve(p);
            }
        }
    }

    /// Build the sample registry from inline samples or the sample sheet.
    pub fn registry(&self) -> Result<SampleRegistry> {
        let reference = self.reference_condition.as_deref();
        match &self.sample_sheet {
            Some(sheet) => SampleRegistry::from_tsv(sheet, &self.condition_column, reference),
            None => SampleRegistry::new(
                self.samples
                    .iter()
                    .map(|s| (s.id.clone(), s.condition.clone())),
                reference,
            ),
        }
    }

    /// Input table path of every registered sample, in registry order.
    pub fn sample_paths(&self, registry: &SampleRegistry) -> Result<Vec<PathBuf>> {
        registry
            .sample_ids()
            .iter()
            .map(|id| {
                let explicit = self
                    .samples
                    .iter()
                    .find(|s| &s.id == id)
                    .and_then(|s| s.path.clone());
                match (explicit, &self.data_dir) {
                    (Some(p), _) => Ok(p),
                    (None, Some(dir)) => Ok(sample_path(dir, id)),
                    (None, None) => Err(SigdiffError::Configuration(format!(
                        "sample '{}' has no path and no data_dir is set",
                        id
                    ))),
                }
            })
            .collect()
    }

    /// Template configuration for an old-versus-young comparison.
    pub fn example() -> Self {
        let samples = [
            ("ERR188044", "old"),
            ("ERR188104", "old"),
            ("ERR188234", "old"),
            ("ERR188245", "young"),
            ("ERR188257", "young"),
            ("ERR188273", "young"),
        ]
        .iter()
        .map(|(id, condition)| SampleEntry {
            id: id.to_string(),
            condition: condition.to_string(),
            path: None,
        })
        .collect();

        Self {
            name: "old-vs-young".to_string(),
            description: Some("Transcript-level differential expression, young over old".to_string()),
            data_dir: Some(PathBuf::from("ballgown")),
            samples,
            sample_sheet: None,
            condition_column: default_condition_column(),
            reference_condition: Some("old".to_string()),
            measurement: MeasurementKind::Fpkm,
            granularity: FeatureGranularity::Transcript,
            variance_threshold: DEFAULT_VARIANCE_THRESHOLD,
            significance_threshold: DEFAULT_SIGNIFICANCE_THRESHOLD,
            log_transform: true,
            output: default_output(),
        }
    }
}

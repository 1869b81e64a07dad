//! Sample registry: sample identifiers and their two-level condition labels.

use crate::error::{Result, SigdiffError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One of the two compared conditions.
///
/// `A` is the reference condition; fold-changes are reported as B over A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    A,
    B,
}

/// A sample and its condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sample identifier.
    pub id: String,
    /// Condition label as written in the input (e.g. "old").
    pub label: String,
    /// Condition the label maps to.
    pub condition: Condition,
}

/// Validated, immutable set of samples for one run.
#[derive(Debug, Clone, Serialize)]
pub struct SampleRegistry {
    samples: Vec<Sample>,
    sample_ids: Vec<String>,
    /// Labels for condition A and condition B, in that order.
    labels: [String; 2],
}

impl SampleRegistry {
    /// Build a registry from `(id, label)` pairs.
    ///
    /// Ids must be unique and exactly two distinct labels must be present.
    /// `reference` names the label used as condition A; without it the
    /// lexicographically smaller label is the reference.
    pub fn new<I, S, L>(entries: I, reference: Option<&str>) -> Result<Self>
    where
        I: IntoIterator<Item = (S, L)>,
        S: Into<String>,
        L: Into<String>,
    {
        let entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(id, label)| (id.into(), label.into()))
            .collect();

        if entries.is_empty() {
            return Err(SigdiffError::Configuration(
                "sample registry is empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (id, _) in &entries {
            if id.trim().is_empty() {
                return Err(SigdiffError::Configuration(
                    "sample id must not be empty".to_string(),
                ));
            }
            if !seen.insert(id.as_str()) {
                return Err(SigdiffError::Configuration(format!(
                    "duplicate sample id '{}'",
                    id
                )));
            }
        }

        let mut levels: Vec<&str> = entries.iter().map(|(_, l)| l.as_str()).collect();
        levels.sort_unstable();
        levels.dedup();
        if levels.len() != 2 {
            return Err(SigdiffError::Configuration(format!(
                "expected exactly 2 condition labels, found {}: {:?}",
                levels.len(),
                levels
            )));
        }

        let labels = match reference {
            Some(r) if r == levels[0] => [levels[0].to_string(), levels[1].to_string()],
            Some(r) if r == levels[1] => [levels[1].to_string(), levels[0].to_string()],
            Some(r) => {
                return Err(SigdiffError::Configuration(format!(
                    "reference condition '{}' is not one of {:?}",
                    r, levels
                )))
            }
            None => [levels[0].to_string(), levels[1].to_string()],
        };

        let samples: Vec<Sample> = entries
            .into_iter()
            .map(|(id, label)| {
                let condition = if label == labels[0] {
                    Condition::A
                } else {
                    Condition::B
                };
                Sample {
                    id,
                    label,
                    condition,
                }
            })
            .collect();
        let sample_ids = samples.iter().map(|s| s.id.clone()).collect();

        Ok(Self {
            samples,
            sample_ids,
            labels,
        })
    }

    /// Load a registry from a sample sheet.
    ///
    /// Expected format: tab-delimited, header row, first column is the sample
    /// ID, `condition_column` names the column holding the condition label.
    pub fn from_tsv<P: AsRef<Path>>(
        path: P,
        condition_column: &str,
        reference: Option<&str>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut lines = reader.lines();

        let header_line = lines
            .next()
            .ok_or_else(|| SigdiffError::EmptyData("empty sample sheet".to_string()))??;
        let header: Vec<&str> = header_line.split('\t').map(str::trim).collect();
        let col = header
            .iter()
            .skip(1)
            .position(|h| *h == condition_column)
            .map(|i| i + 1)
            .ok_or_else(|| {
                SigdiffError::data_format(
                    path,
                    format!("missing column '{}'", condition_column),
                )
            })?;

        let mut entries = Vec::new();
        for (row, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            let label = fields.get(col).filter(|v| !v.is_empty()).ok_or_else(|| {
                SigdiffError::data_format(
                    path,
                    format!("row {} has no value for '{}'", row + 1, condition_column),
                )
            })?;
            entries.push((fields[0].to_string(), label.to_string()));
        }

        Self::new(entries, reference)
    }

    /// Samples in registry order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Sample identifiers in registry order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    /// Label written for a condition.
    pub fn label(&self, condition: Condition) -> &str {
        match condition {
            Condition::A => &self.labels[0],
            Condition::B => &self.labels[1],
        }
    }

    /// Condition of a sample, if registered.
    pub fn condition_of(&self, sample_id: &str) -> Option<Condition> {
        self.samples
            .iter()
            .find(|s| s.id == sample_id)
            .map(|s| s.condition)
    }

    /// Column indices of the samples in one condition.
    pub fn indices(&self, condition: Condition) -> Vec<usize> {
        self.samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.condition == condition)
            .map(|(i, _)| i)
            .collect()
    }

    /// Check that a table's column order matches this registry exactly.
    pub fn check_columns(&self, sample_ids: &[String]) -> Result<()> {
        if sample_ids != self.sample_ids.as_slice() {
            return Err(SigdiffError::SampleMismatch(format!(
                "table columns {:?} do not match registry order {:?}",
                sample_ids, self.sample_ids
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pairs() -> Vec<(&'static str, &'static str)> {
        vec![("s1", "young"), ("s2", "old"), ("s3", "young"), ("s4", "old")]
    }

    #[test]
    fn test_default_reference_is_smaller_label() {
        let reg = SampleRegistry::new(pairs(), None).unwrap();
        assert_eq!(reg.label(Condition::A), "old");
        assert_eq!(reg.label(Condition::B), "young");
        assert_eq!(reg.indices(Condition::A), vec![1, 3]);
        assert_eq!(reg.indices(Condition::B), vec![0, 2]);
        assert_eq!(reg.sample_ids(), &["s1", "s2", "s3", "s4"]);
    }

    #[test]
    fn test_explicit_reference() {
        let reg = SampleRegistry::new(pairs(), Some("young")).unwrap();
        assert_eq!(reg.label(Condition::A), "young");
        assert_eq!(reg.condition_of("s1"), Some(Condition::A));
        assert_eq!(reg.condition_of("s2"), Some(Condition::B));
        assert_eq!(reg.condition_of("missing"), None);
    }

    #[test]
    fn test_unknown_reference() {
        let err = SampleRegistry::new(pairs(), Some("middle")).unwrap_err();
        assert!(matches!(err, SigdiffError::Configuration(_)));
    }

    #[test]
    fn test_duplicate_ids() {
        let err = SampleRegistry::new(vec![("s1", "a"), ("s1", "b")], None).unwrap_err();
        assert!(matches!(err, SigdiffError::Configuration(_)));
    }

    #[test]
    fn test_condition_cardinality() {
        let one = SampleRegistry::new(vec![("s1", "a"), ("s2", "a")], None);
        assert!(matches!(one, Err(SigdiffError::Configuration(_))));

        let three = SampleRegistry::new(vec![("s1", "a"), ("s2", "b"), ("s3", "c")], None);
        assert!(matches!(three, Err(SigdiffError::Configuration(_))));
    }

    #[test]
    fn test_check_columns() {
        let reg = SampleRegistry::new(pairs(), None).unwrap();
        let ordered: Vec<String> = reg.sample_ids().to_vec();
        assert!(reg.check_columns(&ordered).is_ok());

        let mut swapped = ordered.clone();
        swapped.swap(0, 1);
        assert!(matches!(
            reg.check_columns(&swapped),
            Err(SigdiffError::SampleMismatch(_))
        ));
    }

    #[test]
    fn test_from_tsv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ids\ttype\tbatch").unwrap();
        writeln!(file, "ERR188044\told\t1").unwrap();
        writeln!(file, "ERR188104\tyoung\t1").unwrap();
        writeln!(file, "ERR188234\told\t2").unwrap();
        writeln!(file).unwrap();
        file.flush().unwrap();

        let reg = SampleRegistry::from_tsv(file.path(), "type", None).unwrap();
        assert_eq!(reg.n_samples(), 3);
        assert_eq!(reg.condition_of("ERR188104"), Some(Condition::B));

        let missing = SampleRegistry::from_tsv(file.path(), "sex", None);
        assert!(matches!(missing, Err(SigdiffError::DataFormat { .. })));
    }
}

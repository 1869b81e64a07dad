//! Loading per-sample transcript quantification tables.
//!
//! Each sample directory written by the upstream assembler holds a
//! `t_data.ctab` table with one row per transcript. The loader reads one
//! such table per sample, aligns them by transcript id and assembles an
//! [`Experiment`]: the transcript table, the gene table derived from it and
//! the feature annotation.

mod ctab;

pub use ctab::{read_ctab, CtabRecord, CTAB_FILE_NAME};

use crate::data::{
    ExpressionTable, FeatureAnnotation, FeatureGranularity, MeasurementKind, SampleRegistry,
};
use crate::error::{Result, SigdiffError};
use nalgebra::DMatrix;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Everything one run analyses, loaded once and passed explicitly.
#[derive(Debug, Clone)]
pub struct Experiment {
    pub registry: SampleRegistry,
    pub annotation: FeatureAnnotation,
    pub transcripts: ExpressionTable,
    pub genes: ExpressionTable,
}

impl Experiment {
    /// Table for a feature granularity.
    pub fn table(&self, granularity: FeatureGranularity) -> &ExpressionTable {
        match granularity {
            FeatureGranularity::Transcript => &self.transcripts,
            FeatureGranularity::Gene => &self.genes,
        }
    }

    pub fn measurement(&self) -> MeasurementKind {
        self.transcripts.measurement()
    }
}

/// Default location of a sample's table: `<data_dir>/<sample_id>/t_data.ctab`.
pub fn sample_path(data_dir: &Path, sample_id: &str) -> PathBuf {
    data_dir.join(sample_id).join(CTAB_FILE_NAME)
}

/// Load one table per registered sample.
///
/// `paths` must follow the registry order. Every sample must report the same
/// set of transcript ids; rows follow the first sample's order and columns
/// follow the registry.
pub fn load_experiment(
    registry: SampleRegistry,
    paths: &[PathBuf],
    measurement: MeasurementKind,
) -> Result<Experiment> {
    if paths.len() != registry.n_samples() {
        return Err(SigdiffError::DimensionMismatch {
            expected: registry.n_samples(),
            actual: paths.len(),
        });
    }

    let mut annotation = FeatureAnnotation::new();
    let mut transcript_ids: Vec<String> = Vec::new();
    let mut row_of: HashMap<String, usize> = HashMap::new();
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(paths.len());

    for (sample, path) in registry.samples().iter().zip(paths) {
        if !path.is_file() {
            return Err(SigdiffError::MissingInput {
                sample: sample.id.clone(),
                path: path.clone(),
            });
        }
        let records = read_ctab(path, measurement)?;
        log::debug!(
            "Loaded {} transcripts for sample '{}' from {}",
            records.len(),
            sample.id,
            path.display()
        );

        if columns.is_empty() {
            for rec in &records {
                annotation.insert(&rec.t_id, &rec.t_name, &rec.gene_id, &rec.gene_name);
                row_of.insert(rec.t_id.clone(), transcript_ids.len());
                transcript_ids.push(rec.t_id.clone());
            }
        } else if records.len() != transcript_ids.len() {
            return Err(SigdiffError::data_format(
                path,
                format!(
                    "{} transcripts, expected {} as in the first sample",
                    records.len(),
                    transcript_ids.len()
                ),
            ));
        }

        let mut column = vec![f64::NAN; transcript_ids.len()];
        for rec in &records {
            let row = row_of.get(&rec.t_id).copied().ok_or_else(|| {
                SigdiffError::data_format(
                    path,
                    format!("transcript '{}' absent from the first sample", rec.t_id),
                )
            })?;
            column[row] = rec.value;
        }
        columns.push(column);
    }

    let n_rows = transcript_ids.len();
    let data = DMatrix::from_fn(n_rows, columns.len(), |r, c| columns[c][r]);
    let transcripts = ExpressionTable::new(
        data,
        transcript_ids,
        registry.sample_ids().to_vec(),
        measurement,
        FeatureGranularity::Transcript,
    )?;
    let genes = aggregate_genes(&transcripts, &annotation)?;

    log::info!(
        "Loaded {} samples: {} transcripts, {} genes ({})",
        registry.n_samples(),
        transcripts.n_features(),
        genes.n_features(),
        measurement
    );

    Ok(Experiment {
        registry,
        annotation,
        transcripts,
        genes,
    })
}

/// Gene-level table: per sample, the sum of the gene's transcript values.
///
/// Genes are ordered by first appearance among the transcripts.
pub fn aggregate_genes(
    transcripts: &ExpressionTable,
    annotation: &FeatureAnnotation,
) -> Result<ExpressionTable> {
    let mut gene_ids: Vec<String> = Vec::new();
    let mut gene_row: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<Vec<f64>> = Vec::new();

    for (row, t_id) in transcripts.feature_ids().iter().enumerate() {
        let info = annotation.transcript(t_id).ok_or_else(|| {
            SigdiffError::Pipeline(format!("transcript '{}' has no gene annotation", t_id))
        })?;
        let g = match gene_row.get(info.gene_id.as_str()) {
            Some(&g) => g,
            None => {
                gene_row.insert(info.gene_id.as_str(), gene_ids.len());
                gene_ids.push(info.gene_id.clone());
                sums.push(vec![0.0; transcripts.n_samples()]);
                gene_ids.len() - 1
            }
        };
        for (col, sum) in sums[g].iter_mut().enumerate() {
            *sum += transcripts.get(row, col);
        }
    }

    ExpressionTable::from_rows(
        &sums,
        gene_ids,
        transcripts.sample_ids().to_vec(),
        transcripts.measurement(),
        FeatureGranularity::Gene,
    )
}

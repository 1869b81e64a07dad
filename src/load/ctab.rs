//! Reader for per-sample transcript tables (`t_data.ctab`).

use crate::data::MeasurementKind;
use crate::error::{Result, SigdiffError};
use std::collections::HashSet;
use std::path::Path;

/// File name of the per-sample transcript table.
pub const CTAB_FILE_NAME: &str = "t_data.ctab";

/// One transcript row of a sample's table.
#[derive(Debug, Clone, PartialEq)]
pub struct CtabRecord {
    pub t_id: String,
    pub t_name: String,
    pub gene_id: String,
    pub gene_name: String,
    /// Value of the selected measurement column.
    pub value: f64,
}

/// Read the transcript rows of one sample.
///
/// The table is tab-delimited with a header row. Only `t_id`, `t_name`,
/// `gene_id`, `gene_name` and the measurement column are read; other
/// columns may be present in any order.
pub fn read_ctab<P: AsRef<Path>>(path: P, measurement: MeasurementKind) -> Result<Vec<CtabRecord>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .quoting(false)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| SigdiffError::data_format(path, format!("missing column '{}'", name)))
    };
    let i_tid = column("t_id")?;
    let i_tname = column("t_name")?;
    let i_gid = column("gene_id")?;
    let i_gname = column("gene_name")?;
    let i_value = column(measurement.column())?;

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");

        let t_id = field(i_tid);
        if t_id.is_empty() {
            return Err(SigdiffError::data_format(
                path,
                format!("row {} has an empty t_id", row + 1),
            ));
        }
        if !seen.insert(t_id.to_string()) {
            return Err(SigdiffError::data_format(
                path,
                format!("duplicate t_id '{}'", t_id),
            ));
        }

        let raw = field(i_value);
        let value: f64 = raw.parse().map_err(|_| SigdiffError::InvalidValue {
            value: raw.to_string(),
            row,
            column: measurement.column().to_string(),
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(SigdiffError::InvalidValue {
                value: raw.to_string(),
                row,
                column: measurement.column().to_string(),
            });
        }

        records.push(CtabRecord {
            t_id: t_id.to_string(),
            t_name: field(i_tname).to_string(),
            gene_id: field(i_gid).to_string(),
            gene_name: field(i_gname).to_string(),
            value,
        });
    }

    Ok(records)
}

//! Human-readable names for transcripts and genes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Annotation of a single transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptInfo {
    pub transcript_id: String,
    pub transcript_name: String,
    pub gene_id: String,
}

/// Feature id to name lookup.
///
/// Transcripts map many-to-one onto genes. Gene order is the order in which
/// genes are first seen among the transcripts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureAnnotation {
    transcripts: Vec<TranscriptInfo>,
    transcript_index: HashMap<String, usize>,
    gene_ids: Vec<String>,
    gene_names: HashMap<String, String>,
    gene_transcripts: HashMap<String, Vec<usize>>,
}

impl FeatureAnnotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transcript.
    ///
    /// A repeated transcript id keeps its first registration. The first gene
    /// name seen for a gene id wins.
    pub fn insert(
        &mut self,
        transcript_id: &str,
        transcript_name: &str,
        gene_id: &str,
        gene_name: &str,
    ) {
        if self.transcript_index.contains_key(transcript_id) {
            return;
        }
        let idx = self.transcripts.len();
        self.transcripts.push(TranscriptInfo {
            transcript_id: transcript_id.to_string(),
            transcript_name: transcript_name.to_string(),
            gene_id: gene_id.to_string(),
        });
        self.transcript_index.insert(transcript_id.to_string(), idx);

        if !self.gene_names.contains_key(gene_id) {
            self.gene_ids.push(gene_id.to_string());
            self.gene_names
                .insert(gene_id.to_string(), gene_name.to_string());
        }
        self.gene_transcripts
            .entry(gene_id.to_string())
            .or_default()
            .push(idx);
    }

    /// Transcripts in registration order.
    pub fn transcripts(&self) -> &[TranscriptInfo] {
        &self.transcripts
    }

    /// Gene ids in first-seen order.
    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    pub fn n_transcripts(&self) -> usize {
        self.transcripts.len()
    }

    pub fn n_genes(&self) -> usize {
        self.gene_ids.len()
    }

    pub fn transcript(&self, transcript_id: &str) -> Option<&TranscriptInfo> {
        self.transcript_index
            .get(transcript_id)
            .map(|&i| &self.transcripts[i])
    }

    pub fn gene_name(&self, gene_id: &str) -> Option<&str> {
        self.gene_names.get(gene_id).map(String::as_str)
    }

    /// Transcripts belonging to a gene, in registration order.
    pub fn transcripts_of(&self, gene_id: &str) -> Vec<&TranscriptInfo> {
        self.gene_transcripts
            .get(gene_id)
            .map(|idx| idx.iter().map(|&i| &self.transcripts[i]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_annotation() -> FeatureAnnotation {
        let mut ann = FeatureAnnotation::new();
        ann.insert("1", "NM_001", "MSTRG.1", "GENE1");
        ann.insert("2", "NM_002", "MSTRG.1", "GENE1");
        ann.insert("3", "MSTRG.2.1", "MSTRG.2", ".");
        ann
    }

    #[test]
    fn test_many_to_one() {
        let ann = create_annotation();
        assert_eq!(ann.n_transcripts(), 3);
        assert_eq!(ann.n_genes(), 2);
        assert_eq!(ann.gene_ids(), &["MSTRG.1", "MSTRG.2"]);

        let names: Vec<&str> = ann
            .transcripts_of("MSTRG.1")
            .iter()
            .map(|t| t.transcript_name.as_str())
            .collect();
        assert_eq!(names, vec!["NM_001", "NM_002"]);
        assert!(ann.transcripts_of("nope").is_empty());
    }

    #[test]
    fn test_lookup() {
        let ann = create_annotation();
        let t = ann.transcript("2").unwrap();
        assert_eq!(t.gene_id, "MSTRG.1");
        assert_eq!(ann.gene_name(&t.gene_id), Some("GENE1"));
        assert_eq!(ann.gene_name("MSTRG.2"), Some("."));
        assert!(ann.transcript("9").is_none());
    }

    #[test]
    fn test_repeated_insert_keeps_first() {
        let mut ann = create_annotation();
        ann.insert("1", "OTHER", "MSTRG.9", "X");
        assert_eq!(ann.n_transcripts(), 3);
        assert_eq!(ann.transcript("1").unwrap().transcript_name, "NM_001");
        assert_eq!(ann.n_genes(), 2);
    }
}

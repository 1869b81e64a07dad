//! End-to-end tests: ctab fixtures on disk through to the ranked report.

use sigdiff::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str =
    "t_id\tchr\tstrand\tstart\tend\tt_name\tnum_exons\tlength\tgene_id\tgene_name\tcov\tFPKM";

const SAMPLES: [(&str, &str); 4] = [
    ("o1", "old"),
    ("o2", "old"),
    ("y1", "young"),
    ("y2", "young"),
];

/// (t_id, t_name, gene_id, gene_name, FPKM per sample in SAMPLES order)
type Transcript = (&'static str, &'static str, &'static str, &'static str, [f64; 4]);

fn default_transcripts() -> Vec<Transcript> {
    vec![
        // Perfect separation
        ("1", "NM_1", "G1", "ABC", [1.0, 1.0, 100.0, 100.0]),
        // Constant, removed by the variance filter
        ("2", "NM_2", "G1", "ABC", [5.0, 5.0, 5.0, 5.0]),
        // Noisy, no shift
        ("3", "NM_3", "G2", "XYZ", [10.0, 14.0, 11.0, 13.0]),
        // Clear tenfold increase
        ("4", "NM_4", "G3", "QRS", [2.0, 4.0, 40.0, 44.0]),
    ]
}

fn write_fixtures(dir: &Path, transcripts: &[Transcript]) {
    for (col, (sample, _)) in SAMPLES.iter().enumerate() {
        let path = sample_path(dir, sample);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut text = String::from(HEADER);
        text.push('\n');
        for (t_id, t_name, gene_id, gene_name, values) in transcripts {
            text.push_str(&format!(
                "{}\tchr1\t+\t1000\t2000\t{}\t3\t1000\t{}\t{}\t{}\t{}\n",
                t_id,
                t_name,
                gene_id,
                gene_name,
                values[col] * 2.0,
                values[col]
            ));
        }
        fs::write(path, text).unwrap();
    }
}

fn config(dir: &Path) -> AnalysisConfig {
    let yaml = format!(
        "name: fixture\ndata_dir: {}\noutput: {}\nsamples:\n{}",
        dir.display(),
        dir.join("SigDiff.txt").display(),
        SAMPLES
            .iter()
            .map(|(id, cond)| format!("  - {{ id: {}, condition: {} }}\n", id, cond))
            .collect::<String>()
    );
    AnalysisConfig::from_yaml(&yaml).unwrap()
}

fn setup(transcripts: &[Transcript]) -> (TempDir, AnalysisConfig) {
    let dir = TempDir::new().unwrap();
    write_fixtures(dir.path(), transcripts);
    let config = config(dir.path());
    (dir, config)
}

#[test]
fn test_report_written_sorted_and_thresholded() {
    let (_dir, config) = setup(&default_transcripts());
    let output = run_config(&config).unwrap();

    let ids: Vec<&str> = output.report.iter().map(|r| r.feature_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4"]);
    assert!(output.report.is_sorted());
    assert!(output.report.iter().all(|r| r.p_value < 0.05));

    let text = fs::read_to_string(&config.output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "geneNames\ttranscriptNames\tid\tfc\tpval\tqval");
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("ABC\tNM_1\t1\t100\t0\t0"));
    assert!(lines[2].starts_with("QRS\tNM_4\t4\t14\t"));
}

#[test]
fn test_rerun_is_byte_identical() {
    let (dir, mut config) = setup(&default_transcripts());
    run_config(&config).unwrap();
    let first = fs::read(&config.output).unwrap();

    config.output = dir.path().join("again.txt");
    run_config(&config).unwrap();
    let second = fs::read(&config.output).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_filter_drops_constant_row() {
    let (_dir, config) = setup(&default_transcripts());
    let experiment = load_config_experiment(&config).unwrap();
    let output = Pipeline::from_config(&config).run(&experiment).unwrap();

    assert_eq!(experiment.transcripts.n_features(), 4);
    assert_eq!(output.filtered.n_features(), 3);
    assert!(output.filtered.feature_index("2").is_none());
    assert!(output.results.get_feature("2").is_none());

    let summary = output.summary();
    assert_eq!(summary.n_loaded, 4);
    assert_eq!(summary.n_kept, 3);
    assert_eq!(summary.n_tested, 3);
    assert_eq!(summary.n_significant, 2);
}

#[test]
fn test_all_filtered_gives_header_only() {
    let flat: Vec<Transcript> = vec![
        ("1", "NM_1", "G1", "ABC", [0.5, 2.5, 2.5, 2.5]),
        ("2", "NM_2", "G2", "XYZ", [2.5, 0.5, 2.5, 2.5]),
    ];
    let (_dir, config) = setup(&flat);
    let output = run_config(&config).unwrap();

    assert!(output.filtered.is_empty());
    assert!(output.report.is_empty());
    assert_eq!(
        fs::read_to_string(&config.output).unwrap(),
        "geneNames\ttranscriptNames\tid\tfc\tpval\tqval\n"
    );
}

#[test]
fn test_gene_level_sums_transcripts() {
    let (_dir, mut config) = setup(&default_transcripts());
    config.granularity = FeatureGranularity::Gene;
    let experiment = load_config_experiment(&config).unwrap();

    let g1 = experiment.genes.feature_index("G1").unwrap();
    assert_eq!(experiment.genes.row(g1), vec![6.0, 6.0, 105.0, 105.0]);

    let output = Pipeline::from_config(&config).run(&experiment).unwrap();
    assert_eq!(output.report.rows[0].feature_id, "G1");
    assert_eq!(output.report.rows[0].gene_name, "ABC");
    assert_eq!(output.report.rows[0].transcript_name, "NM_1,NM_2");
}

#[test]
fn test_coverage_measurement() {
    let (_dir, mut config) = setup(&default_transcripts());
    config.measurement = MeasurementKind::Cov;
    let experiment = load_config_experiment(&config).unwrap();
    let row = experiment.transcripts.feature_index("4").unwrap();
    assert_eq!(experiment.transcripts.row(row), vec![4.0, 8.0, 80.0, 88.0]);
}

#[test]
fn test_raw_scale_option() {
    let (_dir, mut config) = setup(&default_transcripts());
    let experiment = load_config_experiment(&config).unwrap();
    let logged = Pipeline::from_config(&config).run(&experiment).unwrap();
    config.log_transform = false;
    let raw = Pipeline::from_config(&config).run(&experiment).unwrap();

    let a = logged.results.get_feature("4").unwrap();
    let b = raw.results.get_feature("4").unwrap();
    assert_eq!(a.fold_change, b.fold_change);
    assert!(a.statistic != b.statistic);
}

#[test]
fn test_missing_sample_file() {
    let (dir, config) = setup(&default_transcripts());
    fs::remove_file(sample_path(dir.path(), "y2")).unwrap();

    match load_config_experiment(&config) {
        Err(SigdiffError::MissingInput { sample, path }) => {
            assert_eq!(sample, "y2");
            assert_eq!(path, sample_path(dir.path(), "y2"));
        }
        other => panic!("expected MissingInput, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_three_conditions_rejected() {
    let (_dir, mut config) = setup(&default_transcripts());
    config.samples[3].condition = "middle".to_string();
    assert!(matches!(
        load_config_experiment(&config),
        Err(SigdiffError::Configuration(_))
    ));
}

#[test]
fn test_mismatched_transcripts_rejected() {
    let (dir, config) = setup(&default_transcripts());
    let path = sample_path(dir.path(), "o2");
    let text = fs::read_to_string(&path).unwrap().replace("\n4\t", "\n5\t");
    fs::write(&path, text).unwrap();

    assert!(matches!(
        load_config_experiment(&config),
        Err(SigdiffError::DataFormat { .. })
    ));
}

#[test]
fn test_reference_condition_sets_direction() {
    let (_dir, mut config) = setup(&default_transcripts());
    config.reference_condition = Some("young".to_string());
    let experiment = load_config_experiment(&config).unwrap();
    let output = Pipeline::from_config(&config).run(&experiment).unwrap();

    assert_eq!(output.results.reference, "young");
    assert_eq!(output.report.rows[0].fold_change, 0.01);
}

#[test]
fn test_example_config_roundtrip_to_file() {
    let dir = TempDir::new().unwrap();
    let path: PathBuf = dir.path().join("analysis.yaml");
    fs::write(&path, AnalysisConfig::example().to_yaml().unwrap()).unwrap();

    let loaded = AnalysisConfig::from_file(&path).unwrap();
    assert_eq!(loaded.samples.len(), 6);
    assert_eq!(loaded.data_dir, Some(dir.path().join("ballgown")));
    assert_eq!(loaded.output, PathBuf::from("SigDiff.txt"));
}

//! sigdiff - two-condition differential expression CLI
//!
//! Command-line interface for ranking differentially expressed transcripts
//! or genes from per-sample quantification tables.

use clap::{Parser, Subcommand, ValueEnum};
use sigdiff::error::{Result, SigdiffError};
use sigdiff::pipeline::{load_config_experiment, run_config, AnalysisConfig, Pipeline};
use sigdiff::plot::{
    condition_means, feature_boxplot, features_per_parent, histogram, log2_fold_changes,
    replicate_concordance,
};
use std::path::{Path, PathBuf};

/// Kind of plot data to emit
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlotKind {
    /// log2(x + 1) of two sample columns
    Replicate,
    /// Per-feature condition means on the log2(x + 1) scale
    Means,
    /// Histogram of transcripts per gene
    PerGene,
    /// Histogram of log2 fold-changes of tested features
    FoldChange,
    /// Per-condition distribution of one feature
    Boxplot,
}

/// Output format for the summary
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SummaryFormat {
    Text,
    Json,
}

/// Two-condition differential expression
#[derive(Parser)]
#[command(name = "sigdiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an analysis from a YAML configuration file
    Run {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Output path for the ranked report (overrides the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Variance threshold (overrides the config)
        #[arg(long)]
        variance_threshold: Option<f64>,

        /// Significance threshold on the p-value (overrides the config)
        #[arg(long)]
        significance_threshold: Option<f64>,

        /// Also write the variance-filtered table to this path
        #[arg(long)]
        write_filtered: Option<PathBuf>,
    },

    /// Write an example configuration file
    Example {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "analysis.yaml")]
        output: PathBuf,
    },

    /// Emit plot-ready data as JSON
    PlotData {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// What to emit
        #[arg(short, long, value_enum)]
        kind: PlotKind,

        /// First sample (replicate)
        #[arg(long)]
        x_sample: Option<String>,

        /// Second sample (replicate)
        #[arg(long)]
        y_sample: Option<String>,

        /// Feature id (boxplot)
        #[arg(long)]
        feature: Option<String>,

        /// Number of histogram bins
        #[arg(long, default_value = "30")]
        bins: usize,

        /// Plot raw values instead of log2(x + 1) (boxplot)
        #[arg(long)]
        raw: bool,

        /// Output path for JSON (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run an analysis and print a summary without writing the report
    Summary {
        /// Path to analysis configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: SummaryFormat,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let result = match cli.command {
        Commands::Run {
            config,
            output,
            variance_threshold,
            significance_threshold,
            write_filtered,
        } => cmd_run(
            &config,
            output,
            variance_threshold,
            significance_threshold,
            write_filtered.as_deref(),
        ),

        Commands::Example { output } => cmd_example(&output),

        Commands::PlotData {
            config,
            kind,
            x_sample,
            y_sample,
            feature,
            bins,
            raw,
            output,
        } => cmd_plot_data(
            &config,
            kind,
            x_sample.as_deref(),
            y_sample.as_deref(),
            feature.as_deref(),
            bins,
            !raw,
            output.as_deref(),
        ),

        Commands::Summary { config, format } => cmd_summary(&config, format),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Run an analysis from configuration
fn cmd_run(
    config_path: &Path,
    output: Option<PathBuf>,
    variance_threshold: Option<f64>,
    significance_threshold: Option<f64>,
    write_filtered: Option<&Path>,
) -> Result<()> {
    eprintln!("Loading configuration from {:?}...", config_path);
    let mut config = AnalysisConfig::from_file(config_path)?;
    if let Some(output) = output {
        config.output = output;
    }
    if let Some(t) = variance_threshold {
        config.variance_threshold = t;
    }
    if let Some(t) = significance_threshold {
        config.significance_threshold = t;
    }
    config.validate()?;

    eprintln!("Running analysis '{}'...", config.name);
    let output = run_config(&config)?;

    if let Some(path) = write_filtered {
        output.filtered.to_tsv(path)?;
        eprintln!("Wrote filtered table to {:?}", path);
    }

    eprintln!("Wrote report to {:?}", config.output);
    eprint!("{}", output.summary());
    Ok(())
}

/// Write an example configuration
fn cmd_example(output_path: &Path) -> Result<()> {
    let yaml = AnalysisConfig::example().to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}

/// Emit plot data as JSON
#[allow(clippy::too_many_arguments)]
fn cmd_plot_data(
    config_path: &Path,
    kind: PlotKind,
    x_sample: Option<&str>,
    y_sample: Option<&str>,
    feature: Option<&str>,
    bins: usize,
    log_scale: bool,
    output: Option<&Path>,
) -> Result<()> {
    let config = AnalysisConfig::from_file(config_path)?;
    let experiment = load_config_experiment(&config)?;
    let table = experiment.table(config.granularity);

    let json = match kind {
        PlotKind::Replicate => {
            let (x, y) = x_sample.zip(y_sample).ok_or_else(|| {
                SigdiffError::InvalidParameter(
                    "replicate plot needs --x-sample and --y-sample".to_string(),
                )
            })?;
            serde_json::to_string_pretty(&replicate_concordance(table, x, y)?)?
        }
        PlotKind::Means => {
            serde_json::to_string_pretty(&condition_means(table, &experiment.registry)?)?
        }
        PlotKind::PerGene => {
            let counts: Vec<f64> = features_per_parent(&experiment.annotation)
                .into_iter()
                .map(|n| n as f64)
                .collect();
            serde_json::to_string_pretty(&histogram(&counts, bins)?)?
        }
        PlotKind::FoldChange => {
            let output = Pipeline::from_config(&config).run(&experiment)?;
            serde_json::to_string_pretty(&histogram(&log2_fold_changes(&output.results), bins)?)?
        }
        PlotKind::Boxplot => {
            let feature = feature.ok_or_else(|| {
                SigdiffError::InvalidParameter("boxplot needs --feature".to_string())
            })?;
            serde_json::to_string_pretty(&feature_boxplot(
                table,
                &experiment.registry,
                feature,
                log_scale,
            )?)?
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, &json)?;
            eprintln!("Wrote plot data to {:?}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Print a run summary
fn cmd_summary(config_path: &Path, format: SummaryFormat) -> Result<()> {
    let config = AnalysisConfig::from_file(config_path)?;
    let experiment = load_config_experiment(&config)?;
    let output = Pipeline::from_config(&config).run(&experiment)?;
    let summary = output.summary();

    match format {
        SummaryFormat::Text => {
            print!("{}", summary);
            print!("{}", output.results.summary());
        }
        SummaryFormat::Json => {
            let json = serde_json::json!({
                "pipeline": summary,
                "results": output.results.summary(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

//! CLI entry point for the corruption injector.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use lex_corruption::{
    CorruptionEngine, CorruptionPlan, CorruptionReport, CorruptionStep, Dataset, NoiseScaling,
    ReportWriter, VariantStrategy, category_percent, suggest_drift_range,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// CLI-compatible noise scaling enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliNoiseScaling {
    /// Noise in the column's native units
    Absolute,
    /// Noise multiplied by the column mean
    RelativeToMean,
}

impl From<CliNoiseScaling> for NoiseScaling {
    fn from(cli: CliNoiseScaling) -> Self {
        match cli {
            CliNoiseScaling::Absolute => NoiseScaling::Absolute,
            CliNoiseScaling::RelativeToMean => NoiseScaling::RelativeToMean,
        }
    }
}

/// CLI-compatible variant strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliVariantStrategy {
    /// One candidate set shared by every replaced row
    SharedCandidates,
    /// An independent single-character mutation per replaced row
    PerRowMutation,
}

impl From<CliVariantStrategy> for VariantStrategy {
    fn from(cli: CliVariantStrategy) -> Self {
        match cli {
            CliVariantStrategy::SharedCandidates => VariantStrategy::SharedCandidates,
            CliVariantStrategy::PerRowMutation => VariantStrategy::PerRowMutation,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Parameterized data corruption for data-quality checks",
    long_about = "Applies a JSON corruption plan (drift, duplicates, label leakage, string \
                  variants) to a CSV file and writes the corrupted CSV.\n\n\
                  EXAMPLES:\n  \
                  # Apply a plan with a fixed seed\n  \
                  lex-corruption -i iris.csv -p plan.json --label target --seed 42\n\n  \
                  # Preview the plan and suggested parameter ranges\n  \
                  lex-corruption -i iris.csv -p plan.json --label target --dry-run\n\n  \
                  # Print the report as JSON\n  \
                  lex-corruption -i iris.csv -p plan.json --json | jq .steps"
)]
struct Args {
    /// Path to the CSV file to corrupt
    #[arg(short, long)]
    input: String,

    /// Path to the JSON corruption plan
    #[arg(short, long)]
    plan: String,

    /// Output directory for results
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Custom output file name (without extension)
    ///
    /// If not specified, uses "<input_name>_corrupted"
    #[arg(long)]
    output_name: Option<String>,

    /// Label column of the dataset
    ///
    /// Required for label correlation steps
    #[arg(short = 't', long)]
    label: Option<String>,

    /// Comma-separated categorical features
    ///
    /// If not specified, string and boolean columns are treated as categorical
    #[arg(long, value_delimiter = ',')]
    cat_features: Option<Vec<String>>,

    /// Random seed, overrides the seed in the plan
    #[arg(long)]
    seed: Option<u64>,

    /// Override the noise scaling of every numerical drift step
    #[arg(long, value_enum)]
    scaling: Option<CliNoiseScaling>,

    /// Override the strategy of every variant step
    #[arg(long, value_enum)]
    variant_strategy: Option<CliVariantStrategy>,

    /// Validate the plan and show suggested parameter ranges without corrupting
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the JSON report to stdout instead of a human-readable summary
    ///
    /// Disables all progress logs.
    #[arg(long)]
    json: bool,

    /// Write the JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so stdout only carries
/// the report.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let plan = load_plan(&args)?;
    info!("Loaded plan with {} steps", plan.steps.len());

    info!("Loading dataset from: {}", args.input);
    let data = load_csv_with_fallbacks(&args.input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let dataset = build_dataset(&args, data)?;

    if args.dry_run {
        return run_dry_run(&args, &dataset, &plan);
    }

    run_corruption(&args, &dataset, &plan)
}

/// Read the plan and apply command-line overrides.
fn load_plan(args: &Args) -> Result<CorruptionPlan> {
    let mut plan = CorruptionPlan::from_json_file(&args.plan)
        .map_err(|e| anyhow!("Failed to load plan '{}': {}", args.plan, e))?;

    if let Some(seed) = args.seed {
        plan.seed = Some(seed);
    }

    for step in &mut plan.steps {
        match step {
            CorruptionStep::NumericalDrift { scaling, .. } => {
                if let Some(cli) = args.scaling {
                    *scaling = cli.into();
                }
            }
            CorruptionStep::Variants { strategy, .. } => {
                if let Some(cli) = args.variant_strategy {
                    *strategy = cli.into();
                }
            }
            _ => {}
        }
    }

    Ok(plan)
}

fn build_dataset(args: &Args, data: DataFrame) -> Result<Dataset> {
    let mut dataset = Dataset::new(data);
    if let Some(ref cat_features) = args.cat_features {
        dataset = dataset.with_cat_features(cat_features.iter().map(|c| c.trim().to_string()))?;
    }
    if let Some(ref label) = args.label {
        dataset = dataset.with_label(label)?;
    }
    Ok(dataset)
}

/// Run dry-run mode - show the plan and parameter hints without corrupting.
///
/// Uses `println!` on purpose: this output is the point of --dry-run and
/// should not depend on the log level.
fn run_dry_run(args: &Args, dataset: &Dataset, plan: &CorruptionPlan) -> Result<()> {
    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of corruption plan");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Rows: {}", dataset.n_samples());
    println!("  Columns: {}", dataset.data().width());
    println!("  Label: {}", dataset.label_name().unwrap_or("(none)"));
    println!("  Categorical: {}", dataset.cat_features().join(", "));
    println!("  Numerical: {}", dataset.numerical_features().join(", "));
    println!(
        "  Seed: {}",
        plan.seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "(random)".to_string())
    );

    println!("\nPLANNED STEPS");
    println!("{}", "-".repeat(40));
    for (i, step) in plan.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step.describe());
        match step {
            CorruptionStep::NumericalDrift { column, .. } => {
                match suggest_drift_range(dataset, column) {
                    Ok(range) => println!(
                        "     suggested: mean <= {:.4}, std <= {:.4}, step {:.4}",
                        range.max_mean, range.max_std, range.step
                    ),
                    Err(e) => println!("     warning: {}", e),
                }
            }
            CorruptionStep::CategoricalDrift {
                column, category, ..
            } => match dataset.data().column(column) {
                Ok(col) => {
                    let current = category_percent(col.as_materialized_series(), category)?;
                    println!("     current share of '{}': {:.2}%", category, current);
                }
                Err(_) => println!("     warning: column '{}' not found", column),
            },
            CorruptionStep::Variants { column, .. } => match dataset.data().column(column) {
                Ok(col) => println!("     distinct values: {}", col.n_unique()?),
                Err(_) => println!("     warning: column '{}' not found", column),
            },
            _ => {}
        }
    }

    println!("\n{}", "=".repeat(80));
    println!("Run without --dry-run to write the corrupted dataset.");
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Apply the plan, write the corrupted CSV and report.
fn run_corruption(args: &Args, dataset: &Dataset, plan: &CorruptionPlan) -> Result<()> {
    if !Path::new(&args.output).exists() {
        std::fs::create_dir_all(&args.output)?;
        info!("Created output directory: {}", args.output);
    }

    let mut engine = CorruptionEngine::from_plan(plan);
    let outcome = match engine.apply(dataset, plan) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Corruption failed: {}", e);
            return Err(anyhow!("Corruption failed: {}", e));
        }
    };

    let input_stem = extract_file_stem(&args.input);
    let output_name = args
        .output_name
        .clone()
        .unwrap_or_else(|| format!("{}_corrupted", input_stem));

    let writer = ReportWriter::new(PathBuf::from(&args.output));
    info!("Writing outputs to: {}", writer.output_dir().display());
    let mut corrupted = outcome.dataset.into_data();
    let output_path = writer.write_dataset(&mut corrupted, &output_name)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        return Ok(());
    }

    if args.emit_report {
        let report_path = writer.write_report(&outcome.report, &input_stem)?;
        info!("Report written to: {}", report_path.display());
    }

    print_human_readable_summary(&outcome.report, &output_path);
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

fn print_human_readable_summary(report: &CorruptionReport, output_path: &Path) {
    println!("\n{}", "=".repeat(80));
    println!("CORRUPTION SUMMARY");
    println!("{}", "=".repeat(80));
    println!("  Rows: {} -> {}", report.rows_before, report.rows_after);
    println!("  Columns: {}", report.columns);
    if let Some(seed) = report.seed {
        println!("  Seed: {}", seed);
    }
    println!();
    for step in &report.steps {
        println!(
            "  {}. {} ({} cells changed)",
            step.index, step.description, step.changed_cells
        );
    }
    println!("\n  Total cells changed: {}", report.total_changed_cells());
    println!("  Output: {}", output_path.display());
    println!("{}", "=".repeat(80));
}

fn load_csv_with_fallbacks(path: &str) -> Result<DataFrame> {
    // Strategy 1: Standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: Scan the whole file for the schema
    match CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => Ok(df),
        Err(e) => {
            error!("Could not read file: {}", e);
            Err(e.into())
        }
    }
}

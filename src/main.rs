use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use ghost_gcs::scoring::{GcsReport, PenaltyMode, PredictionMatching, ScoringConfig};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_SCORING: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Tsv,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PenaltyArg {
    Count,
    Position,
}

impl From<PenaltyArg> for PenaltyMode {
    fn from(arg: PenaltyArg) -> Self {
        match arg {
            PenaltyArg::Count => PenaltyMode::Count,
            PenaltyArg::Position => PenaltyMode::Position,
        }
    }
}

/// Scoring options shared by both subcommands; each overrides the config file
#[derive(clap::Args, Debug)]
struct ScoringArgs {
    /// Abort on the first malformed question id
    #[arg(long)]
    strict: bool,

    /// Penalty model (count is the published metric)
    #[arg(long, value_enum)]
    penalty: Option<PenaltyArg>,

    /// Accept chatty answers like "True." or "Yes, it is"
    #[arg(long)]
    lenient: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one prediction file
    Evaluate {
        /// JSON array of prediction records
        pred_path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Also list the score of every object/category sequence
        #[arg(short, long)]
        breakdown: bool,

        /// Write the full JSON report to this path as well
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        scoring: ScoringArgs,
    },
    /// Rank several prediction files (one per model) by overall GCS
    Compare {
        /// Prediction files or glob patterns, e.g. "preds/*.json"
        #[arg(required = true)]
        patterns: Vec<String>,

        #[command(flatten)]
        scoring: ScoringArgs,
    },
}

#[derive(Parser, Debug)]
#[command(name = "ghost-gcs")]
#[command(
    about = "Ghost Consistency Score for vision-language model predictions",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/ghost-gcs/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn apply_overrides(mut scoring: ScoringConfig, args: &ScoringArgs) -> ScoringConfig {
    if args.strict {
        scoring.strict = true;
    }
    if let Some(penalty) = args.penalty {
        scoring.penalty = penalty.into();
    }
    if args.lenient {
        scoring.prediction_matching = PredictionMatching::Lenient;
    }
    scoring
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let start_time = Instant::now();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match ghost_gcs::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let file_scoring = config.scoring.unwrap_or_default();
    let scoring_args = match &cli.command {
        Commands::Evaluate { scoring, .. } | Commands::Compare { scoring, .. } => scoring,
    };
    let scoring = apply_overrides(file_scoring, scoring_args);

    // Validate scoring config at startup
    if let Err(errors) = ghost_gcs::scoring::validate_scoring(&scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }
    debug!(?scoring, "effective scoring config");

    let use_colors = ghost_gcs::output::should_use_colors();

    match cli.command {
        Commands::Evaluate {
            pred_path,
            format,
            breakdown,
            output,
            ..
        } => {
            let report = match score_file(&pred_path, &scoring) {
                Ok(r) => r,
                Err((code, message)) => {
                    eprintln!("{}", message);
                    std::process::exit(code);
                }
            };

            match format {
                OutputFormat::Table => {
                    println!(
                        "{}",
                        ghost_gcs::output::format_summary(&report, scoring.decimals, use_colors)
                    );
                    if breakdown || cli.verbose {
                        println!();
                        println!(
                            "{}",
                            ghost_gcs::output::format_breakdown(
                                &report.breakdown,
                                scoring.decimals,
                                use_colors
                            )
                        );
                    }
                }
                OutputFormat::Tsv => {
                    println!("{}", ghost_gcs::output::format_tsv(&report, scoring.decimals));
                }
                OutputFormat::Json => match ghost_gcs::output::format_json(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize report: {}", e);
                        std::process::exit(EXIT_SCORING);
                    }
                },
            }

            report_diagnostics(&pred_path, &report, cli.verbose);

            if let Some(output_path) = output {
                let file = ghost_gcs::output::ReportFile::new(&pred_path, &report);
                if let Err(e) = ghost_gcs::output::save_report(&output_path, &file) {
                    eprintln!("Failed to write report: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
                if cli.verbose {
                    eprintln!("Report written to {}", output_path.display());
                }
            }
        }
        Commands::Compare { patterns, .. } => {
            let paths = expand_patterns(&patterns);
            if paths.is_empty() {
                eprintln!("No prediction files matched {}", patterns.join(" "));
                std::process::exit(EXIT_INPUT);
            }

            // A bad file is skipped; the rest still get ranked
            let mut scored: Vec<(String, GcsReport)> = Vec::new();
            for path in &paths {
                match score_file(path, &scoring) {
                    Ok(report) => {
                        report_diagnostics(path, &report, cli.verbose);
                        let name = report
                            .model_name
                            .clone()
                            .unwrap_or_else(|| file_label(path));
                        scored.push((name, report));
                    }
                    Err((_, message)) => eprintln!("Skipping {}: {}", path.display(), message),
                }
            }

            if scored.is_empty() {
                eprintln!("No prediction file could be scored.");
                std::process::exit(EXIT_INPUT);
            }

            // Sort by overall descending, then by name for ties
            scored.sort_by(|a, b| {
                ghost_gcs::scoring::compare_overall(&a.1, &b.1).then_with(|| a.0.cmp(&b.0))
            });

            let models: Vec<ghost_gcs::output::ScoredModel> = scored
                .iter()
                .map(|(name, report)| ghost_gcs::output::ScoredModel { name, report })
                .collect();
            println!(
                "{}",
                ghost_gcs::output::format_ranking(&models, scoring.decimals, use_colors)
            );
        }
    }

    if cli.verbose {
        eprintln!();
        eprintln!(
            "Done in {}",
            humantime::format_duration(round_to_millis(start_time.elapsed()))
        );
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Load and score one file, mapping failures to an exit code and message
fn score_file(path: &Path, scoring: &ScoringConfig) -> Result<GcsReport, (i32, String)> {
    let records = ghost_gcs::records::load_predictions(path)
        .map_err(|e| (EXIT_INPUT, format!("Input error: {}", e)))?;
    ghost_gcs::scoring::evaluate_records(&records, scoring)
        .map_err(|e| (EXIT_SCORING, format!("Scoring error: {}", e)))
}

fn report_diagnostics(source: &Path, report: &GcsReport, verbose: bool) {
    if verbose {
        for diagnostic in report.diagnostics.iter() {
            warn!(file = %source.display(), "{}", diagnostic);
        }
    }
    let summary = ghost_gcs::output::format_diagnostics_summary(source, &report.diagnostics);
    if !summary.is_empty() {
        eprintln!("{}", summary);
    }
}

fn expand_patterns(patterns: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for pattern in patterns {
        match glob::glob(pattern) {
            Ok(entries) => {
                let before = paths.len();
                for entry in entries {
                    match entry {
                        Ok(path) => paths.push(path),
                        Err(e) => warn!("unreadable glob match: {}", e),
                    }
                }
                // A plain path that matched nothing is still reported by the loader
                if paths.len() == before && !pattern.contains(&['*', '?', '['][..]) {
                    paths.push(PathBuf::from(pattern));
                }
            }
            Err(e) => warn!("invalid pattern '{}': {}", pattern, e),
        }
    }
    paths.sort();
    paths.dedup();
    paths
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn round_to_millis(elapsed: std::time::Duration) -> std::time::Duration {
    std::time::Duration::from_millis(elapsed.as_millis() as u64)
}

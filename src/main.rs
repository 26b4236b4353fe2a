//! Review Analyzer - complaint statistics for product reviews
//!
//! The main entry point. It parses command-line arguments, loads the review
//! file and prints or exports the resulting report.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use colored::Colorize;
use log::{error, info, LevelFilter};

use review_analyzer::config::{load_config, AnalyzerConfig};
use review_analyzer::core::aggregator::{AnalysisReport, ModelFilter, ReviewAnalyzer};
use review_analyzer::utils::output_formatter;
use review_analyzer::utils::review_loader::load_reviews;

/// Command line argument structure
#[derive(Parser, Debug)]
#[command(
    name = "review_analyzer",
    version,
    about = "Classifies product reviews into complaint categories",
    long_about = "Reads a spreadsheet of customer reviews and reports:
- the models with the most negative reviews and their main complaint
- how often each complaint category occurs
- the reviews behind each category, per model"
)]
struct Args {
    /// Spreadsheet (xlsx, xls, xlsb, ods) or CSV file with reviews
    input: PathBuf,

    /// Worksheet holding the reviews (default: отзывы)
    #[arg(long = "sheet")]
    sheet: Option<String>,

    /// Path to JSON configuration file
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Number of models in the summary table (default: 20)
    #[arg(long = "top")]
    top: Option<usize>,

    /// Highest star rating counted as negative (default: 4)
    #[arg(long = "threshold")]
    threshold: Option<f64>,

    /// Print the review listing of this category
    #[arg(long = "category")]
    category: Option<String>,

    /// Restrict the category listing to one model
    #[arg(long = "model", requires = "category")]
    model: Option<String>,

    /// Export the report to a JSON file
    #[arg(long = "json")]
    json: Option<PathBuf>,

    /// Export the report to an HTML file
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// Write one CSV file per category into this directory
    #[arg(long = "csv-dir")]
    csv_dir: Option<PathBuf>,

    /// Directory prefixed to relative output paths
    #[arg(long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Output in markdown format (wrapped in triple backticks)
    #[arg(long = "md", action = ArgAction::SetTrue)]
    md: bool,

    /// Suppress terminal output
    #[arg(long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,

    /// Show only summary information
    #[arg(long = "summary-only", action = ArgAction::SetTrue)]
    summary_only: bool,

    /// Set logging level (default: INFO)
    #[arg(long = "log-level", default_value = "info")]
    log_level: LevelFilter,

    /// Log file path (default: review_analyzer.log)
    #[arg(long = "log-file", default_value = "review_analyzer.log")]
    log_file: String,
}

fn main() {
    let args = Args::parse();

    setup_logging(&args);

    if let Err(e) = run(&args) {
        error!("{:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    // Configuration file first, then command line overrides
    let config = build_config(args);
    let analyzer = ReviewAnalyzer::from_config(&config).context("Invalid configuration")?;

    // Load and classify the reviews
    let reviews = load_reviews(&args.input, &config)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let report = analyzer.analyze(&reviews);

    // The listing is validated before anything is written
    let listing = match &args.category {
        Some(category) => {
            let detail = report
                .category(category)
                .ok_or_else(|| anyhow!("No negative reviews in category '{}'", category))?;
            let filter = ModelFilter::from_selection(args.model.as_deref());
            Some(format!(
                "{}{}",
                output_formatter::format_filter_options(detail),
                output_formatter::format_category_reviews(detail, &filter)
            ))
        }
        None => None,
    };

    // Exports
    export_report(&report, args)?;

    // Terminal output
    if !args.quiet {
        println!("{}", output_formatter::create_summary(&report));

        if !args.summary_only {
            println!("{}", output_formatter::format_report(&report, &args.md));
        }
        if let Some(listing) = listing {
            println!("{}", listing);
        }

        println!(
            "{} {:.2} seconds",
            "Time elapsed:".green(),
            start_time.elapsed().as_secs_f64()
        );
    }

    info!("Analysis finished in {:?}", start_time.elapsed());
    Ok(())
}

/// Set up logging with file output
fn setup_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    // Set log level
    builder.filter_level(args.log_level);

    // Timestamped format
    builder.format(|buf, record| {
        use chrono::Local;
        use std::io::Write;
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    // Log to file; stderr if the file cannot be created
    if let Ok(file) = File::create(&args.log_file) {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
}

/// Merge the configuration file with command line overrides
fn build_config(args: &Args) -> AnalyzerConfig {
    let mut config = load_config(args.config.as_deref());

    if let Some(sheet) = &args.sheet {
        config.sheet_name = sheet.clone();
    }
    if let Some(top) = args.top {
        config.top_models = top;
    }
    if let Some(threshold) = args.threshold {
        config.negative_threshold = threshold;
    }

    config
}

/// Write every export requested on the command line
fn export_report(report: &AnalysisReport, args: &Args) -> Result<()> {
    if let Some(output_dir) = &args.output_dir {
        std::fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;
    }

    if let Some(json_path) = &args.json {
        output_formatter::export_report_json(report, &output_path(args, json_path))?;
    }

    if let Some(html_path) = &args.html {
        output_formatter::create_html_report(report, &output_path(args, html_path))?;
    }

    if let Some(csv_dir) = &args.csv_dir {
        output_formatter::export_category_csvs(report, &output_path(args, csv_dir))?;
    }

    Ok(())
}

/// Resolve a relative output path against the output directory
fn output_path(args: &Args, path: &Path) -> PathBuf {
    match &args.output_dir {
        Some(output_dir) if path.is_relative() => output_dir.join(path),
        _ => path.to_path_buf(),
    }
}

//! Promotion sales trainer CLI
//!
//! Trains the promotion sales model end to end, summarizes a table, or
//! predicts with a saved model blob.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use promo_trainer::{load_table, run_pipeline, DataSummary, PipelineConfig, PromotionModelProcessor};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "promo-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Random forest model for promotion sales", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Pipeline configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, train, evaluate, save and report (default)
    Run(RunArgs),
    /// Log a descriptive summary of one table
    Analyze {
        /// Table path or URL
        #[arg(short, long)]
        input: String,
    },
    /// Predict units sold with a saved model
    Predict {
        /// Model blob written by `run`
        #[arg(short, long)]
        model: PathBuf,

        /// Table path or URL
        #[arg(short, long)]
        input: String,

        /// Write predictions as JSON instead of logging them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Training table path or URL
    #[arg(long)]
    train: Option<String>,

    /// Validation table path or URL
    #[arg(long)]
    validation: Option<String>,

    /// Where to save the model blob
    #[arg(long)]
    model: Option<PathBuf>,

    /// Where to write the JSON results
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Promotion Model Trainer v{}", env!("CARGO_PKG_VERSION"));
    info!("═══════════════════════════════════════════");

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path).context("Failed to load configuration")?,
        None => PipelineConfig::default(),
    };

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => {
            if let Some(train) = args.train {
                config.data.train_location = train;
            }
            if let Some(validation) = args.validation {
                config.data.validation_location = validation;
            }
            if let Some(model) = args.model {
                config.output.model_path = model;
            }
            if let Some(report) = args.report {
                config.output.report_path = report;
            }
            run(&config)
        }
        Command::Analyze { input } => analyze(&input),
        Command::Predict {
            model,
            input,
            output,
        } => predict(&model, &input, output),
    }
}

fn run(config: &PipelineConfig) -> Result<()> {
    let Some(outcome) = run_pipeline(config).context("Pipeline failed")? else {
        return Ok(());
    };

    info!("═══════════════════════════════════════════");
    info!("✓ Pipeline completed successfully");
    info!("  Model: {} ({})", outcome.saved.path.display(), outcome.saved.hash);
    info!("  Results: {}", outcome.report_path.display());

    Ok(())
}

fn analyze(input: &str) -> Result<()> {
    let table = load_table(input).with_context(|| format!("Failed to load {input}"))?;
    info!("Data shape: {:?}", table.shape());
    DataSummary::from_table(&table).log();
    Ok(())
}

fn predict(model: &Path, input: &str, output: Option<PathBuf>) -> Result<()> {
    let mut processor = PromotionModelProcessor::new();
    processor
        .load_model(model)
        .with_context(|| format!("Failed to load model from {}", model.display()))?;

    let table = load_table(input).with_context(|| format!("Failed to load {input}"))?;
    let predictions = processor.predict(&table).context("Prediction failed")?;

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&predictions)?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} predictions to {}", predictions.len(), path.display());
        }
        None => {
            for (row, value) in predictions.iter().enumerate() {
                info!("  row {}: {:.2}", row, value);
            }
        }
    }
    Ok(())
}

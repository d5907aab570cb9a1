//! ChurnRadar: churn risk scoring and customer segmentation from
//! pre-trained models.
//!
//! The entrypoint wires the CLI to artifact loading, inference, reporting
//! and batch scoring.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use churnradar::cli::{AnalyzeArgs, BatchArgs, Cli, Commands, ProfileArgs};
use churnradar::encode::CHURN_FEATURE_NAMES;
use churnradar::model::{ModelBundle, CHURN_MODEL_FILE, SCALER_FILE, SEGMENT_MODEL_FILE};
use churnradar::{batch, encode, interpret, report, viz};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(&cli.models, args)?,
        Commands::Batch(args) => run_batch(&cli.models, args)?,
        Commands::Encode(args) => run_encode(&args)?,
        Commands::Models => run_models(&cli.models)?,
    }

    Ok(())
}

/// Load the bundle, turning an unavailable bundle into an actionable
/// message that names the three expected files.
fn load_bundle(dir: &Path) -> Result<ModelBundle> {
    ModelBundle::load(dir).map_err(|err| {
        anyhow::anyhow!(
            "{}. Ensure {}, {} and {} are present in {}",
            err,
            CHURN_MODEL_FILE,
            SEGMENT_MODEL_FILE,
            SCALER_FILE,
            dir.display()
        )
    })
}

fn run_analyze(models_dir: &Path, args: AnalyzeArgs) -> Result<()> {
    let bundle = load_bundle(models_dir)?;
    let profile = args.profile.to_profile()?;
    let prediction = bundle.analyze(&profile)?;

    print!("{}", report::format_card(&prediction));

    if let Some(path) = args.json {
        let analysis = report::build_report(&profile, &prediction);
        report::write_json(&path, &analysis)?;
        println!("\nAnalysis report saved to: {}", path.display());
    }

    Ok(())
}

fn run_batch(models_dir: &Path, args: BatchArgs) -> Result<()> {
    let bundle = load_bundle(models_dir)?;
    let summary = batch::score_csv(&bundle, &args.input, &args.output)?;

    println!("✓ Scored {} customers", summary.rows);
    println!("Scored CSV saved to: {}", args.output.display());

    println!("\n=== Segment Distribution ===");
    for (label, &count) in summary.segment_counts.iter().enumerate() {
        let percentage = (count as f64 / summary.rows as f64) * 100.0;
        println!(
            "{}: {} customers ({:.1}%)",
            interpret::segment_info(label).name,
            count,
            percentage
        );
    }

    println!("\n=== Churn Tiers ===");
    for (tier, &count) in ["Low", "Medium", "High"].iter().zip(summary.tier_counts.iter()) {
        let percentage = (count as f64 / summary.rows as f64) * 100.0;
        println!("{}: {} customers ({:.1}%)", tier, count, percentage);
    }

    if let Some(plot) = &args.plot {
        let plot_path = plot.to_str().context("plot path is not valid UTF-8")?;
        println!();
        viz::render_batch_charts(&summary, plot_path)?;
    }

    Ok(())
}

/// Encode-only mode: works without any model artifacts.
fn run_encode(args: &ProfileArgs) -> Result<()> {
    let profile = args.to_profile()?;
    let churn = encode::churn_vector(&profile);
    let segment = encode::segment_vector(&profile);

    println!("=== Encoded Features ===");
    for (name, value) in CHURN_FEATURE_NAMES.iter().zip(churn.iter()) {
        println!("{:>24}: {}", name, value);
    }

    println!("\nchurn vector   ({} features): {:?}", churn.len(), churn.to_vec());
    println!(
        "segment vector ({} features): {:?}",
        segment.len(),
        segment.to_vec()
    );

    Ok(())
}

fn run_models(models_dir: &Path) -> Result<()> {
    let bundle = load_bundle(models_dir)?;
    print!("{}", report::format_models(&bundle));
    Ok(())
}
